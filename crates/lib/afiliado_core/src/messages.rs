//! User-facing message catalogue.
//!
//! The product ships in Brazilian Portuguese; every notification the
//! controllers emit comes from here.

pub const SESSION_EXPIRED: &str = "Sessão expirada. Faça login novamente.";
pub const NETWORK_ERROR: &str = "Erro de conexão com o servidor";
pub const FORBIDDEN: &str = "Você não tem permissão para esta ação";

/// Fallback when a failed `GET` carries no readable message.
pub const LOAD_FAILED: &str = "Erro ao carregar dados";
/// Fallback when a failed `POST` carries no readable message.
pub const SEND_FAILED: &str = "Erro ao enviar dados";
/// Fallback when a failed `PUT` carries no readable message.
pub const UPDATE_FAILED: &str = "Erro ao atualizar dados";
/// Fallback when a failed `DELETE` carries no readable message.
pub const DELETE_FAILED: &str = "Erro ao deletar";

pub const LOGOUT: &str = "Sessão encerrada";
pub const REGISTER_SUCCESS: &str = "Conta criada com sucesso! Faça login.";
pub const REGISTER_FAILED: &str = "Erro ao criar conta. Tente novamente.";

pub const PRODUCT_CREATED: &str = "Produto criado com sucesso!";
pub const PRODUCT_UPDATED: &str = "Produto atualizado!";
pub const PRODUCT_DELETED: &str = "Produto deletado!";
pub const PRODUCT_CREATE_FAILED: &str = "Erro ao criar produto";
pub const PRODUCT_UPDATE_FAILED: &str = "Erro ao atualizar produto";
pub const PRODUCT_DELETE_FAILED: &str = "Erro ao deletar produto";

pub const REQUIRED_FIELD: &str = "Este campo é obrigatório";
pub const INVALID_EMAIL: &str = "Email inválido";
pub const PASSWORD_MIN_LENGTH: &str = "Senha deve ter no mínimo 6 caracteres";
pub const NAME_MIN_LENGTH: &str = "Nome deve ter no mínimo 2 caracteres";

/// Greeting shown after a successful login.
pub fn welcome(name: &str) -> String {
    format!("Bem-vindo, {name}!")
}
