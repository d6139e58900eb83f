use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::*;
use async_trait::async_trait;
use ledgermail_core::services::{
    AddressService, NameService, PublicKey, PublicKeyService, ResolvedAddress, SendService,
};
use ledgermail_core::{OutboundMail, ServiceResult};
use tracing::{debug, info};
use url::Url;

pub struct MailchainClient {
    client: reqwest::Client,
    base_url: Url,
    protocol: String,
}

impl MailchainClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            protocol: config.protocol.clone(),
        })
    }

    /// Build `{base}/{segments..}?{query}`, percent-encoding each segment
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn check(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status, &body))
    }

    /// List the sender addresses held by the service
    pub async fn list_addresses(&self) -> ApiResult<Vec<String>> {
        let url = self.endpoint(&["addresses"], &[])?;
        debug!("API: listing addresses");

        let response = Self::check(self.client.get(url).send().await?).await?;
        let list: AddressesResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ParseError(e.to_string()))?;

        info!("API: found {} addresses", list.addresses.len());
        Ok(list.addresses)
    }

    /// Resolve a name-service alias to an address
    pub async fn lookup_name(&self, protocol: &str, network: &str, name: &str) -> ApiResult<String> {
        let url = self.endpoint(
            &["nameservice", "name", name, "resolve"],
            &[("protocol", protocol), ("network", network)],
        )?;
        debug!("API: resolving {} on {}/{}", name, protocol, network);

        let response = Self::check(self.client.get(url).send().await?).await?;
        let resolved: ResolveNameResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ParseError(e.to_string()))?;
        Ok(resolved.address)
    }

    /// Fetch the public key registered for an address
    pub async fn public_key(&self, address: &str, network: &str) -> ApiResult<PublicKeyResponse> {
        let url = self.endpoint(
            &["addresses", address, "public-key"],
            &[("protocol", self.protocol.as_str()), ("network", network)],
        )?;
        debug!("API: fetching public key for {} on {}", address, network);

        let response = Self::check(self.client.get(url).send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::ParseError(e.to_string()))
    }

    /// Submit an outbound mail for encryption and delivery
    pub async fn send_message(&self, mail: &OutboundMail, network: &str) -> ApiResult<()> {
        let url = self.endpoint(
            &["messages"],
            &[("protocol", self.protocol.as_str()), ("network", network)],
        )?;
        info!("API: sending message to {} on {}", mail.message.headers.to, network);

        Self::check(self.client.post(url).json(mail).send().await?).await?;
        info!("API: message accepted");
        Ok(())
    }
}

#[async_trait]
impl AddressService for MailchainClient {
    async fn get_addresses(&self) -> ServiceResult<Vec<String>> {
        Ok(self.list_addresses().await?)
    }
}

#[async_trait]
impl NameService for MailchainClient {
    async fn resolve_name(&self, protocol: &str, network: &str, name: &str) -> ServiceResult<ResolvedAddress> {
        let address = self.lookup_name(protocol, network, name).await?;
        Ok(ResolvedAddress::new(address))
    }
}

#[async_trait]
impl PublicKeyService for MailchainClient {
    async fn get_public_key(&self, address: &str, network: &str) -> ServiceResult<PublicKey> {
        let response = self.public_key(address, network).await?;
        Ok(PublicKey {
            public_key: response.public_key,
        })
    }
}

#[async_trait]
impl SendService for MailchainClient {
    async fn send_mail(&self, mail: &OutboundMail, network: &str) -> ServiceResult<()> {
        Ok(self.send_message(mail, network).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgermail_core::services::MailchainService;
    use ledgermail_core::{DefaultMailchain, MessageDraft};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const BOB: &str = "0xd5ab4ce3605cd590db609b6b5c8901fdb2ef7fe6";

    /// Serve one canned HTTP response and return the raw request
    async fn serve_once(status: &'static str, body: &'static str) -> (ApiConfig, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (ApiConfig::local(port), handle)
    }

    #[test]
    fn test_endpoint_building() {
        let client = MailchainClient::new(&ApiConfig::default()).unwrap();

        let url = client
            .endpoint(
                &["nameservice", "name", "bob.eth", "resolve"],
                &[("protocol", "ethereum"), ("network", "mainnet")],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/api/nameservice/name/bob.eth/resolve?protocol=ethereum&network=mainnet"
        );

        let url = client.endpoint(&["addresses", "a/b"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/addresses/a%2Fb");
    }

    #[test]
    fn test_trailing_slash_base() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/api/".to_string(),
            ..Default::default()
        };
        let client = MailchainClient::new(&config).unwrap();
        let url = client.endpoint(&["addresses"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/addresses");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ApiConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(MailchainClient::new(&config), Err(ApiError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_list_addresses() {
        let (config, server) = serve_once("200 OK", r#"{"addresses": ["0xabc", "0xdef"]}"#).await;
        let client = MailchainClient::new(&config).unwrap();

        let addresses = client.get_addresses().await.unwrap();
        assert_eq!(addresses, vec!["0xabc".to_string(), "0xdef".to_string()]);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/addresses HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_resolve_name_error() {
        let (config, server) =
            serve_once("404 Not Found", r#"{"code": 404, "message": "name not found"}"#).await;
        let client = MailchainClient::new(&config).unwrap();

        let err = client
            .resolve_name("ethereum", "mainnet", "nobody.eth")
            .await
            .unwrap_err();
        assert_eq!(err.code, Some(404));
        assert_eq!(err.message, "name not found");

        let request = server.await.unwrap();
        assert!(request.starts_with(
            "GET /api/nameservice/name/nobody.eth/resolve?protocol=ethereum&network=mainnet"
        ));
    }

    #[tokio::test]
    async fn test_public_key_lookup() {
        let (config, server) = serve_once(
            "200 OK",
            r#"{"public_key": "0x0412ab", "public_key_encoding": "hex/0x-prefix"}"#,
        )
        .await;
        let client = MailchainClient::new(&config).unwrap();

        let key = client.get_public_key(BOB, "ropsten").await.unwrap();
        assert_eq!(key.public_key, "0x0412ab");

        let request = server.await.unwrap();
        assert!(request.contains(&format!("/api/addresses/{}/public-key?protocol=ethereum&network=ropsten", BOB)));
    }

    #[tokio::test]
    async fn test_send_posts_outbound_mail() {
        let (config, server) = serve_once("200 OK", "").await;
        let client = MailchainClient::new(&config).unwrap();

        let draft = MessageDraft {
            to: BOB.to_string(),
            from: "0x92d8f10248c6a3953cc3692a894655ad05d61efb".to_string(),
            subject: "Hi".to_string(),
            body: "Hello".to_string(),
            public_key: Some("0x0412ab".to_string()),
        };
        let mail = DefaultMailchain::new().generate_mail(&draft);
        client.send_mail(&mail, "ropsten").await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/messages?protocol=ethereum&network=ropsten"));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let sent: OutboundMail = serde_json::from_str(body).unwrap();
        assert_eq!(sent, mail);
    }
}
