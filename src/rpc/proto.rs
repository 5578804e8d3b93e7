//! Protobuf messages exchanged with the backend services.
//!
//! Messages are declared with `prost` derives instead of build-time codegen.
//! Each also derives serde with camelCase names so the HTTP side can decode
//! request bodies and render responses directly.

pub mod common {
    use serde::{Deserialize, Serialize};

    /// Reason carried in error details.
    #[derive(
        Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration,
    )]
    #[repr(i32)]
    pub enum Reason {
        Unspecified = 0,
        Error = 1,
    }

    impl Reason {
        /// Canonical protobuf name of the value.
        pub fn as_str_name(&self) -> &'static str {
            match self {
                Reason::Unspecified => "REASON_UNSPECIFIED",
                Reason::Error => "REASON_ERROR",
            }
        }
    }

    /// Structured error detail sent in `grpc-status-details-bin`.
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Details {
        #[prost(enumeration = "Reason", tag = "1")]
        pub reason: i32,
        #[prost(string, tag = "2")]
        pub msg: String,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct Location {
        #[prost(double, tag = "1")]
        pub lng: f64,
        #[prost(double, tag = "2")]
        pub lat: f64,
    }
}

pub mod user {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct User {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub username: String,
        #[prost(string, repeated, tag = "3")]
        pub roles: Vec<String>,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct RegisterRequest {
        #[prost(string, tag = "1")]
        pub username: String,
        #[prost(string, tag = "2")]
        pub password: String,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    pub struct RegisterResponse {}

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct LoginRequest {
        #[prost(string, tag = "1")]
        pub username: String,
        #[prost(string, tag = "2")]
        pub password: String,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct LoginResponse {
        #[prost(message, optional, tag = "1")]
        pub user: Option<User>,
        #[prost(string, tag = "2")]
        pub token: String,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    pub struct GetCurrentUserRequest {}

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct GetCurrentUserResponse {
        #[prost(message, optional, tag = "1")]
        pub user: Option<User>,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct ChangePasswordRequest {
        #[prost(string, tag = "1")]
        pub username: String,
        #[prost(string, tag = "2")]
        pub old_password: String,
        #[prost(string, tag = "3")]
        pub new_password: String,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    pub struct ChangePasswordResponse {}
}

pub mod attraction {
    use serde::{Deserialize, Serialize};

    use super::common::Location;

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct Address {
        #[prost(string, tag = "1")]
        pub country: String,
        #[prost(string, tag = "2")]
        pub province: String,
        #[prost(string, tag = "3")]
        pub city: String,
        #[prost(string, tag = "4")]
        pub county: String,
        #[prost(string, tag = "5")]
        pub district: String,
        #[prost(string, tag = "6")]
        pub street: String,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct Attraction {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub name: String,
        #[prost(message, optional, tag = "3")]
        pub address: Option<Address>,
        #[prost(string, tag = "4")]
        pub introduction: String,
        #[prost(string, repeated, tag = "5")]
        pub tags: Vec<String>,
        #[prost(message, optional, tag = "6")]
        pub location: Option<Location>,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct FindAttractionByIdRequest {
        #[prost(string, tag = "1")]
        pub id: String,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct FindAttractionByIdResponse {
        #[prost(message, optional, tag = "1")]
        pub attraction: Option<Attraction>,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct FindAttractionsWithinRadiusRequest {
        #[prost(message, optional, tag = "1")]
        pub location: Option<Location>,
        #[prost(double, tag = "2")]
        pub radius_km: f64,
        #[prost(string, tag = "3")]
        pub name: String,
        #[prost(string, repeated, tag = "4")]
        pub tags: Vec<String>,
    }

    #[derive(Clone, PartialEq, prost::Message, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct FindAttractionsWithinRadiusResponse {
        #[prost(message, repeated, tag = "1")]
        pub content: Vec<Attraction>,
    }
}
