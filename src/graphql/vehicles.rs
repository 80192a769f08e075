//! The `vehicleCreate` mutation and the request body that feeds it.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::info;

use super::client::{GraphqlClient, GraphqlResponse};
use crate::error::{RelayError, UpstreamError};

/// Error label for any non-classified failure of this action.
pub const CREATE_ACTION: &str = "Failed to create vehicle";

const REQUIRED_FIELDS: &str = "Name, make, model, and year are required";

pub const CREATE_VEHICLE: &str = r#"
mutation CreateVehicle($input: VehicleCreateInput!) {
  vehicleCreate(input: $input) {
    vehicle {
      id
      name
      make
      model
      year
    }
    userErrors {
      message
      path
    }
  }
}
"#;

/// Browser form accepts `year` as either a number or the raw input string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum YearField {
    Number(Number),
    Text(String),
}

/// `POST /api/vehicles` body, as sent by the browser.
#[derive(Debug, Default, Deserialize)]
pub struct CreateVehicleBody {
    pub name: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<YearField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleCreateInput {
    pub name: String,
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl CreateVehicleBody {
    /// Validate and normalise into the mutation input.
    pub fn into_input(self) -> Result<VehicleCreateInput, RelayError> {
        let required = || RelayError::BadRequest(REQUIRED_FIELDS.into());

        let name = non_empty(self.name).ok_or_else(required)?;
        let make = non_empty(self.make).ok_or_else(required)?;
        let model = non_empty(self.model).ok_or_else(required)?;
        let year = match self.year.ok_or_else(required)? {
            YearField::Number(n) => {
                let whole = n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64));
                match whole {
                    Some(0) => return Err(required()),
                    Some(y) => y,
                    None => return Err(bad_year()),
                }
            }
            YearField::Text(s) if s.trim().is_empty() => return Err(required()),
            YearField::Text(s) => leading_int(&s).ok_or_else(bad_year)?,
        };
        let year = i32::try_from(year).map_err(|_| bad_year())?;

        Ok(VehicleCreateInput {
            name,
            make,
            model,
            year,
        })
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn bad_year() -> RelayError {
    RelayError::BadRequest("Year must be a whole number".into())
}

/// Integer prefix of a string: "2020", " 2020 ", "2020.5" and "2020abc" all give 2020.
fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[derive(Serialize)]
struct Variables<'a> {
    input: &'a VehicleCreateInput,
}

#[derive(Debug, Deserialize)]
struct CreateVehicleData {
    #[serde(rename = "vehicleCreate")]
    vehicle_create: Option<VehicleCreatePayload>,
}

#[derive(Debug, Deserialize)]
struct VehicleCreatePayload {
    vehicle: Option<Value>,
    #[serde(rename = "userErrors", default)]
    user_errors: Option<Vec<Value>>,
}

/// Run the mutation and return the created vehicle object as the provider sent it.
pub async fn create_vehicle(
    client: &GraphqlClient,
    access_token: &str,
    input: &VehicleCreateInput,
) -> Result<Value, RelayError> {
    let resp: GraphqlResponse<CreateVehicleData> = client
        .execute(access_token, CREATE_VEHICLE, &Variables { input })
        .await
        .map_err(|e| e.during(CREATE_ACTION))?;

    if let Some(errors) = resp.errors {
        return Err(RelayError::Graphql(errors));
    }

    let payload = resp
        .data
        .and_then(|d| d.vehicle_create)
        .ok_or_else(|| {
            UpstreamError::Decode("response is missing data.vehicleCreate".into())
                .during(CREATE_ACTION)
        })?;

    if let Some(user_errors) = payload.user_errors.filter(|e| !e.is_empty()) {
        return Err(RelayError::UserErrors(user_errors));
    }

    let vehicle = payload.vehicle.unwrap_or(Value::Null);
    let vehicle_id = vehicle.get("id").and_then(|id| id.as_str()).unwrap_or("<no id>");
    info!("Vehicle created: {vehicle_id}");
    Ok(vehicle)
}
