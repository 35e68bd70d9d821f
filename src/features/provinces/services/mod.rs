mod province_service;

pub use province_service::ProvinceService;

#[cfg(test)]
pub(crate) use province_service::conditional_criteria;
