//! Provinces and the cities they own.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/provinces/conditional` | Fixed conditional search |
//! | GET | `/api/provinces?page=&rows=` | List provinces (paginated when both are set) |
//! | POST | `/api/provinces` | Create, or selectively update when `id` is set |
//! | GET | `/api/provinces/{id}` | Get province by id |
//! | DELETE | `/api/provinces/{id}` | Delete province by id |
//! | POST | `/api/provinces/with-cities` | Save a province and its cities in one transaction |
//! | GET | `/api/provinces/{id}/cities` | List cities of a province |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::ProvinceService;
