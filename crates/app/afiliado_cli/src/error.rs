use afiliado_api_client::ClientError;
use afiliado_api_client::auth::AuthError;
use afiliado_api_client::products::ProductsError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{}", .0)]
    Custom(String),

    #[error("IO::{:?}: {}", .0, .0)]
    Io(#[from] std::io::Error),

    #[error("Client: {}", .0)]
    Client(#[from] ClientError),

    #[error("Auth: {}", .0)]
    Auth(#[from] AuthError),

    #[error("Products: {}", .0)]
    Products(#[from] ProductsError),
}
