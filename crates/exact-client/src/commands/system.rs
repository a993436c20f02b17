use crate::client::ExactClient;
use crate::errors::ClientError;
use crate::message::{ConfigItem, Request, Response};

impl ExactClient {
    /// Sets the WGS84 origin of the local frame and the angle from east to
    /// its X axis.
    ///
    /// # Errors
    ///
    /// Fails validation for out-of-range latitude or longitude, otherwise
    /// see [`ExactClient::exchange`].
    pub fn config_coordinates(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        orientation: f64,
    ) -> Result<Response, ClientError> {
        self.single(Request::SetCoordinates {
            origin: [latitude, longitude, altitude],
            orientation,
        })
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn config_altitude(&mut self, altitude: f64) -> Result<Response, ClientError> {
        self.single(Request::SetAltitude { altitude })
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn config_get(&mut self, item: ConfigItem) -> Result<Response, ClientError> {
        self.single(Request::GetConfig { item })
    }

    /// Restores every system setting to its default.
    ///
    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn config_reset(&mut self) -> Result<Response, ClientError> {
        self.single(Request::ResetAllConfig)
    }
}
