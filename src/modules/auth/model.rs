pub use masnaa_models::auth::{
    ChangePasswordDto, LoginRequest, LoginResponse, MeResponse, MessageResponse,
};
