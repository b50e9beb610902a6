use common_values_core::FrequencyRecord;
use serde::Deserialize;

use crate::{FailureKind, FetchError};

/// Body of a `/values` response; only `data` matters here.
#[derive(Debug, Deserialize)]
struct ValuesPage {
    data: Vec<FrequencyRecord>,
}

/// Decode one page of value statistics from a JSON body.
pub fn decode_values_page(bytes: &[u8]) -> Result<Vec<FrequencyRecord>, FetchError> {
    serde_json::from_slice::<ValuesPage>(bytes)
        .map(|page| page.data)
        .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
}
