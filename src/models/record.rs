use std::fmt;

use serde::{Deserialize, Serialize};

/// A person-name record, transported as one Kafka message.
///
/// Missing fields deserialize as empty strings. Field order is fixed, so the
/// encoded payload is always `{"surname":..,"first_name":..,"last_name":..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub surname: String,
    pub first_name: String,
    pub last_name: String,
}

impl Record {
    pub fn new(
        surname: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            surname: surname.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record{{surname: {}, first_name: {}, last_name: {}}}",
            self.surname, self.first_name, self.last_name
        )
    }
}
