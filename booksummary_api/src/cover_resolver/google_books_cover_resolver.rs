use anyhow::{bail, Context};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;

use crate::cover_resolver::CoverResolver;

/// Resolves covers through the public (keyless) Google Books volumes search
pub struct GoogleBooksCoverResolver {
    books_api_url: String,
    client: ClientWithMiddleware,
}

#[derive(Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: Option<VolumeInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    image_links: Option<ImageLinks>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

impl GoogleBooksCoverResolver {
    pub fn new(books_api_url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            books_api_url: books_api_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl CoverResolver for GoogleBooksCoverResolver {
    async fn find_cover(&self, title: &str, author: &str) -> anyhow::Result<Option<String>> {
        let query = format!("intitle:{title} inauthor:{author}");
        let response = self
            .client
            .get(format!("{}/books/v1/volumes", self.books_api_url))
            .query(&[("q", query.as_str()), ("maxResults", "1")])
            .send()
            .await
            .context("Failed to search volumes")?;

        if !response.status().is_success() {
            bail!("Volumes search responded with {}", response.status())
        }

        let volumes: VolumesResponse = response
            .json()
            .await
            .context("Failed to parse volumes response")?;

        Ok(volumes
            .items
            .into_iter()
            .next()
            .and_then(|volume| volume.volume_info)
            .and_then(|info| info.image_links)
            .and_then(|links| non_blank(links.thumbnail).or(non_blank(links.small_thumbnail))))
    }
}

fn non_blank(link: Option<String>) -> Option<String> {
    link.filter(|link| !link.trim().is_empty())
}

#[cfg(test)]
mod google_books_cover_resolver_tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn mount_volumes(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/books/v1/volumes"))
            .and(query_param("q", "intitle:Dune inauthor:Frank Herbert"))
            .and(query_param("maxResults", "1"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_prefers_thumbnail_over_small_thumbnail() {
        let server = MockServer::start().await;
        mount_volumes(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "volumeInfo": { "imageLinks": {
                    "smallThumbnail": "http://books/small.jpg",
                    "thumbnail": "http://books/large.jpg"
                }}}]
            })),
        )
        .await;

        let resolver = GoogleBooksCoverResolver::new(&server.uri()).unwrap();
        let cover = resolver
            .find_cover("Dune", "Frank Herbert")
            .await
            .expect("Failed to find cover");
        assert_eq!(cover.as_deref(), Some("http://books/large.jpg"));
    }

    #[tokio::test]
    async fn test_falls_back_to_small_thumbnail() {
        let server = MockServer::start().await;
        mount_volumes(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "volumeInfo": { "imageLinks": { "smallThumbnail": "http://books/small.jpg" }}}]
            })),
        )
        .await;

        let resolver = GoogleBooksCoverResolver::new(&server.uri()).unwrap();
        let cover = resolver.find_cover("Dune", "Frank Herbert").await.unwrap();
        assert_eq!(cover.as_deref(), Some("http://books/small.jpg"));
    }

    #[tokio::test]
    async fn test_empty_thumbnail_falls_through_to_small_thumbnail() {
        let server = MockServer::start().await;
        mount_volumes(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({
                "items": [{ "volumeInfo": { "imageLinks": {
                    "thumbnail": "",
                    "smallThumbnail": "http://books/small.jpg"
                }}}]
            })),
        )
        .await;

        let resolver = GoogleBooksCoverResolver::new(&server.uri()).unwrap();
        let cover = resolver.find_cover("Dune", "Frank Herbert").await.unwrap();
        assert_eq!(cover.as_deref(), Some("http://books/small.jpg"));
    }

    #[tokio::test]
    async fn test_no_items_or_no_links_is_none() {
        let server = MockServer::start().await;
        mount_volumes(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({ "totalItems": 0 })),
        )
        .await;
        let resolver = GoogleBooksCoverResolver::new(&server.uri()).unwrap();
        assert_eq!(resolver.find_cover("Dune", "Frank Herbert").await.unwrap(), None);

        let server = MockServer::start().await;
        mount_volumes(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({ "items": [{ "volumeInfo": {} }] })),
        )
        .await;
        let resolver = GoogleBooksCoverResolver::new(&server.uri()).unwrap();
        assert_eq!(resolver.find_cover("Dune", "Frank Herbert").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status_and_malformed_body_are_errors() {
        let server = MockServer::start().await;
        mount_volumes(&server, ResponseTemplate::new(503)).await;
        let resolver = GoogleBooksCoverResolver::new(&server.uri()).unwrap();
        assert!(resolver.find_cover("Dune", "Frank Herbert").await.is_err());

        let server = MockServer::start().await;
        mount_volumes(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;
        let resolver = GoogleBooksCoverResolver::new(&server.uri()).unwrap();
        assert!(resolver.find_cover("Dune", "Frank Herbert").await.is_err());
    }
}
