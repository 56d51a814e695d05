//! Image download into request-scoped temporary files.

use std::io::Write;

use reqwest::blocking::Client;
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid image URL: {0}")]
    Validation(String),

    #[error("Image download failed: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download `url` into a `.jpg` temp file, deleted when the handle drops.
///
/// The suffix is fixed whatever the actual format; the report decoder sniffs
/// content instead of trusting extensions.
pub fn download_image(client: &Client, url: &str) -> Result<NamedTempFile, FetchError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(FetchError::Validation("URL is empty".into()));
    }

    let response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::Http(format!("request to {url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http(format!("{url} returned HTTP {status}")));
    }

    let bytes = response
        .bytes()
        .map_err(|e| FetchError::Http(format!("reading body of {url}: {e}")))?;

    let mut file = tempfile::Builder::new()
        .prefix("glowmetrics-")
        .suffix(".jpg")
        .tempfile()?;
    file.write_all(&bytes)?;
    file.flush()?;

    tracing::debug!(url, size = bytes.len(), path = %file.path().display(), "Image downloaded");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    /// One-shot HTTP server answering a single request with `status` and `body`.
    fn serve_once(status: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let head = format!(
                    "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(body);
            }
        });
        format!("http://{addr}/photo")
    }

    #[test]
    fn empty_url_is_validation_error() {
        let client = Client::new();
        assert!(matches!(download_image(&client, ""), Err(FetchError::Validation(_))));
        assert!(matches!(download_image(&client, "   "), Err(FetchError::Validation(_))));
    }

    #[test]
    fn downloads_body_to_jpg_temp_file() {
        let url = serve_once("200 OK", b"image-bytes");
        let file = download_image(&Client::new(), &url).unwrap();

        assert_eq!(file.path().extension().and_then(|e| e.to_str()), Some("jpg"));
        assert_eq!(std::fs::read(file.path()).unwrap(), b"image-bytes");
    }

    #[test]
    fn non_success_status_is_http_error() {
        let url = serve_once("404 Not Found", b"missing");
        let result = download_image(&Client::new(), &url);
        assert!(matches!(result, Err(FetchError::Http(msg)) if msg.contains("404")));
    }

    #[test]
    fn temp_file_removed_on_drop() {
        let url = serve_once("200 OK", b"x");
        let file = download_image(&Client::new(), &url).unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());
        drop(file);
        assert!(!path.exists());
    }
}
