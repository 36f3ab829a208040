use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlotsResponse {
    pub available_slots: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDatesResponse {
    pub available_dates: Vec<String>,
}
