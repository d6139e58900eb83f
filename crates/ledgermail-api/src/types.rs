use serde::{Deserialize, Serialize};

/// Response of `GET /addresses`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddressesResponse {
    #[serde(default)]
    pub addresses: Vec<String>,
}

/// Response of `GET /nameservice/name/{name}/resolve`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolveNameResponse {
    pub address: String,
}

/// Response of `GET /addresses/{address}/public-key`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublicKeyResponse {
    pub public_key: String,
    #[serde(default)]
    pub public_key_encoding: Option<String>,
}

/// Error body returned on non-success responses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
}
