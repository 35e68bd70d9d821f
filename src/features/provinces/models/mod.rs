mod city;
mod province;

pub use city::{City, NewCity, ProvinceWithCities};
pub use province::{NewProvince, Province, ProvinceColumn, ProvinceDraft};
