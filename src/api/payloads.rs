use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de, de::DeserializeOwned};

use crate::api::error::ApiError;
use crate::engine::dates::parse_calendar_date;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddExerciseRequest {
    pub description: String,
    #[serde(deserialize_with = "non_negative_integer")]
    pub duration: i64,
    /// Omitted, null or empty means "today".
    #[serde(default, deserialize_with = "optional_date")]
    pub date: Option<NaiveDate>,
}

/// Query string of the logs route. `limit` stays raw so that unusable
/// values fall back to the default cap instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogParams {
    #[serde(default, deserialize_with = "optional_date")]
    pub from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_date")]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub limit: Option<String>,
}

/// Flattened view returned after adding an exercise; `id` is the user's.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseResponse {
    pub id: String,
    pub username: String,
    pub date: String,
    pub duration: i64,
    pub description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

fn non_negative_integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n,
        NumberOrText::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| de::Error::custom(format!("`{text}` is not an integer")))?,
    };
    if value < 0 {
        return Err(de::Error::custom("duration must not be negative"));
    }
    Ok(value)
}

fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_calendar_date(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("`{raw}` is not a valid date"))),
    }
}

/// Body extractor accepting either JSON or an urlencoded HTML form,
/// chosen by `Content-Type`.
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
            Ok(Self(value))
        }
    }
}
