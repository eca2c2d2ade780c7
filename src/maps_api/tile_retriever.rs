use crate::map::base_layer::BaseLayerId;
use crate::map::map_tile::{MapTile, TileId};

use super::{download, DecodedImage, FetchError};

#[derive(Debug, Clone)]
pub struct TileRetriever {
    client: reqwest::Client,
}

impl TileRetriever {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch one tile of `layer` and decode it.
    pub async fn fetch_tile(&self, layer: BaseLayerId, tile: TileId) -> Result<MapTile, FetchError> {
        let url = layer.layer().tile_url(tile);
        log::debug!("fetching tile {}", url);

        self.tile_from(&url, layer, tile).await
    }

    async fn tile_from(&self, url: &str, layer: BaseLayerId, tile: TileId) -> Result<MapTile, FetchError> {
        let image = self.fetch_image(url).await?;
        Ok(MapTile::new(layer, tile, image))
    }

    async fn fetch_image(&self, url: &str) -> Result<DecodedImage, FetchError> {
        let bytes = download(&self.client, url).await?;
        DecodedImage::from_bytes(&bytes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    pub(crate) fn test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .user_agent("jogjamap-test")
            .build()
            .unwrap()
    }

    pub(crate) fn png_bytes() -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 100, 50, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Answer a single HTTP request and hand back what the client sent.
    pub(crate) async fn serve_once(status_line: &'static str, body: Vec<u8>) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8192];
            let n = socket.read(&mut request).await.unwrap();

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request[..n]).into_owned()
        });

        (format!("http://{}/11/1651/1068.png", addr), handle)
    }

    #[tokio::test]
    async fn fetches_and_decodes_a_tile() {
        let (url, server) = serve_once("200 OK", png_bytes()).await;
        let retriever = TileRetriever::new(test_client());

        let image = retriever.fetch_image(&url).await.unwrap();
        assert_eq!(image.size, [4, 4]);

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /11/1651/1068.png"));
        assert!(request.contains("user-agent: jogjamap-test"));
    }

    #[tokio::test]
    async fn fetched_tile_keeps_its_layer_and_address() {
        let (url, server) = serve_once("200 OK", png_bytes()).await;
        let retriever = TileRetriever::new(test_client());
        let id = TileId::new(11, 1651, 1068);

        let tile = retriever.tile_from(&url, BaseLayerId::Topographic, id).await.unwrap();
        assert_eq!(tile.id, id);
        assert_eq!(tile.layer, BaseLayerId::Topographic);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let (url, server) = serve_once("404 Not Found", Vec::new()).await;
        let retriever = TileRetriever::new(test_client());

        let err = retriever.fetch_image(&url).await.unwrap_err();
        match err {
            FetchError::Status { status, .. } => assert_eq!(status, reqwest::StatusCode::NOT_FOUND),
            other => panic!("unexpected error {other}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let (url, server) = serve_once("200 OK", b"<html>rate limited</html>".to_vec()).await;
        let retriever = TileRetriever::new(test_client());

        let err = retriever.fetch_image(&url).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        server.await.unwrap();
    }
}
