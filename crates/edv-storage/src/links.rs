//! Shared link helpers

use reqwest::Url;

/// Force a shared link into direct-download form by setting `dl=1`.
///
/// An existing `dl` parameter keeps its position; otherwise `dl=1` is appended.
pub fn direct_download_url(link: &str) -> Result<String, String> {
    let mut url = Url::parse(link).map_err(|e| format!("Invalid shared link '{}': {}", link, e))?;

    // Other parameters are kept byte-for-byte; only `dl` is rewritten.
    let query = match url.query().filter(|q| !q.is_empty()) {
        Some(query) => {
            let mut found = false;
            let mut pairs: Vec<&str> = query
                .split('&')
                .map(|pair| {
                    let key = pair.split_once('=').map_or(pair, |(key, _)| key);
                    if key == "dl" {
                        found = true;
                        "dl=1"
                    } else {
                        pair
                    }
                })
                .collect();
            if !found {
                pairs.push("dl=1");
            }
            pairs.join("&")
        }
        None => "dl=1".to_string(),
    };

    url.set_query(Some(&query));
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_link() {
        assert_eq!(
            direct_download_url("https://www.dropbox.com/s/abc123/pan.pdf?dl=0").unwrap(),
            "https://www.dropbox.com/s/abc123/pan.pdf?dl=1"
        );
    }

    #[test]
    fn test_link_with_rlkey() {
        assert_eq!(
            direct_download_url("https://www.dropbox.com/scl/fi/xyz/pan.pdf?rlkey=k9&dl=0")
                .unwrap(),
            "https://www.dropbox.com/scl/fi/xyz/pan.pdf?rlkey=k9&dl=1"
        );
    }

    #[test]
    fn test_link_without_dl_param() {
        assert_eq!(
            direct_download_url("https://www.dropbox.com/scl/fi/xyz/pan.pdf?rlkey=k9").unwrap(),
            "https://www.dropbox.com/scl/fi/xyz/pan.pdf?rlkey=k9&dl=1"
        );
        assert_eq!(
            direct_download_url("https://www.dropbox.com/s/abc/a.pdf").unwrap(),
            "https://www.dropbox.com/s/abc/a.pdf?dl=1"
        );
    }

    #[test]
    fn test_already_direct_is_unchanged() {
        let link = "https://www.dropbox.com/s/abc/a.pdf?dl=1";
        assert_eq!(direct_download_url(link).unwrap(), link);
    }

    #[test]
    fn test_other_parameters_keep_their_encoding() {
        assert_eq!(
            direct_download_url("https://www.dropbox.com/scl/fi/x/a.pdf?rlkey=ab~cd&dl=0").unwrap(),
            "https://www.dropbox.com/scl/fi/x/a.pdf?rlkey=ab~cd&dl=1"
        );
        assert_eq!(
            direct_download_url("https://www.dropbox.com/scl/fi/x/a.pdf?rlkey=a%20b&dl=0").unwrap(),
            "https://www.dropbox.com/scl/fi/x/a.pdf?rlkey=a%20b&dl=1"
        );
        assert_eq!(
            direct_download_url("https://www.dropbox.com/scl/fi/x/a.pdf?st=a*b!c").unwrap(),
            "https://www.dropbox.com/scl/fi/x/a.pdf?st=a*b!c&dl=1"
        );
    }

    #[test]
    fn test_fragment_is_kept() {
        assert_eq!(
            direct_download_url("https://www.dropbox.com/s/abc/a.pdf?dl=0#page=2").unwrap(),
            "https://www.dropbox.com/s/abc/a.pdf?dl=1#page=2"
        );
    }

    #[test]
    fn test_invalid_link() {
        assert!(direct_download_url("not a url").is_err());
    }
}
