pub mod fipp;
pub mod image_rcsa;
pub mod rsa_trait;
pub mod rsa_type;
pub mod spectrum_assignment;
