pub mod codes;
pub mod jwt;
pub mod password;
pub mod registration;
pub mod reset;

pub use codes::{random_string, RESET_TOKEN_LEN, VERIFICATION_CODE_LEN};
pub use jwt::{create_token, validate_token, Claims};
pub use password::{hash_password, verify_password};
