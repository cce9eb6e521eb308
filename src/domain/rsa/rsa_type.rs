use std::str::FromStr;

use crate::api::simulation_dto::RsaDto;
use crate::domain::rsa::fipp::Fipp;
use crate::domain::rsa::image_rcsa::ImageRcsa;
use crate::domain::rsa::rsa_trait::Rsa;
use crate::error::Error;

/// Available routing and spectrum assignment strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsaType {
    /// **Failure Independent Path Protecting p-cycles**: first-fit primary path,
    /// protected by a shared p-cycle.
    Fipp,
    /// **Image based RCSA**: dedicated link-disjoint 1+1 protection with best-fit
    /// spectrum assignment.
    ImageRcsa,
}

impl RsaType {
    /// Factory method returning a concrete [`Rsa`] for the variant.
    pub fn get_instance(&self, dto: &RsaDto) -> Box<dyn Rsa> {
        match self {
            RsaType::Fipp => Box::new(Fipp::new(dto.k_paths)),
            RsaType::ImageRcsa => Box::new(ImageRcsa::new(dto.k_paths, dto.reserve_backup)),
        }
    }
}

impl FromStr for RsaType {
    type Err = Error;

    fn from_str(module: &str) -> Result<RsaType, Self::Err> {
        match module {
            "FIPP" => Ok(RsaType::Fipp),
            "ImageRCSA" => Ok(RsaType::ImageRcsa),
            _ => Err(Error::UnknownRsaModule(module.to_string())),
        }
    }
}

/// Builds the strategy configured in `dto`.
pub fn rsa_from_dto(dto: &RsaDto) -> Result<Box<dyn Rsa>, Error> {
    if dto.k_paths == 0 {
        return Err(Error::ConfigurationError("rsa.kPaths must be at least 1".to_string()));
    }
    Ok(RsaType::from_str(&dto.module)?.get_instance(dto))
}
