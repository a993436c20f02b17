//! Cells, base stations and tags.

use crate::client::ExactClient;
use crate::errors::ClientError;
use crate::message::{
    BaseStation, BaseStationUpdate, Cell, CellUpdate, DeviceId, Request, Response, Tag,
    TagNotification,
};

impl ExactClient {
    /// # Errors
    ///
    /// Fails validation for a non-hexadecimal id, otherwise see
    /// [`ExactClient::exchange`].
    pub fn cell_add(&mut self, cell: Cell) -> Result<Response, ClientError> {
        self.single(Request::AddCell { cell })
    }

    /// # Errors
    ///
    /// See [`ExactClient::cell_add`].
    pub fn cell_update(&mut self, cell: CellUpdate) -> Result<Response, ClientError> {
        self.single(Request::UpdateCell { cell })
    }

    /// # Errors
    ///
    /// See [`ExactClient::cell_add`].
    pub fn cell_remove(&mut self, cell_id: &str) -> Result<Response, ClientError> {
        self.single(Request::RemoveCell {
            cell: DeviceId::new(cell_id),
        })
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn cell_remove_all(&mut self) -> Result<Response, ClientError> {
        self.single(Request::RemoveAllCells)
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn cell_list(&mut self) -> Result<Vec<Response>, ClientError> {
        self.multi(Request::ListCells)
    }

    /// # Errors
    ///
    /// Fails validation for non-hexadecimal ids or an orientation above
    /// 359 degrees, otherwise see [`ExactClient::exchange`].
    pub fn bs_add(&mut self, bs: BaseStation) -> Result<Response, ClientError> {
        self.single(Request::AddBaseStation { bs })
    }

    /// # Errors
    ///
    /// See [`ExactClient::bs_add`].
    pub fn bs_update(&mut self, bs: BaseStationUpdate) -> Result<Response, ClientError> {
        self.single(Request::UpdateBaseStation { bs })
    }

    /// # Errors
    ///
    /// See [`ExactClient::bs_add`].
    pub fn bs_remove(&mut self, bs_id: &str) -> Result<Response, ClientError> {
        self.single(Request::RemoveBaseStation {
            bs: DeviceId::new(bs_id),
        })
    }

    /// Removes every base station, or only those of `cell_id`.
    ///
    /// # Errors
    ///
    /// See [`ExactClient::bs_add`].
    pub fn bs_remove_all(&mut self, cell_id: Option<&str>) -> Result<Response, ClientError> {
        self.single(Request::RemoveAllBaseStations {
            cell: cell_id.map(DeviceId::new),
        })
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn bs_list(&mut self) -> Result<Vec<Response>, ClientError> {
        self.multi(Request::ListBaseStations)
    }

    /// # Errors
    ///
    /// Fails validation for a non-hexadecimal id, otherwise see
    /// [`ExactClient::exchange`].
    pub fn tag_add(&mut self, tag: Tag) -> Result<Response, ClientError> {
        self.single(Request::AddTag { tag })
    }

    /// # Errors
    ///
    /// See [`ExactClient::tag_add`].
    pub fn tag_update(&mut self, tag: Tag) -> Result<Response, ClientError> {
        self.single(Request::UpdateTag { tag })
    }

    /// # Errors
    ///
    /// See [`ExactClient::tag_add`].
    pub fn tag_remove(&mut self, tag_id: &str) -> Result<Response, ClientError> {
        self.single(Request::RemoveTag {
            tag: DeviceId::new(tag_id),
        })
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn tag_remove_all(&mut self) -> Result<Response, ClientError> {
        self.single(Request::RemoveAllTags)
    }

    /// # Errors
    ///
    /// See [`ExactClient::exchange`].
    pub fn tag_list(&mut self) -> Result<Vec<Response>, ClientError> {
        self.multi(Request::ListTags)
    }

    /// Pushes `ntfn` to one tag, or to every tag when `tag_id` is `None`.
    ///
    /// # Errors
    ///
    /// See [`ExactClient::tag_add`].
    pub fn ntfn_send(
        &mut self,
        tag_id: Option<&str>,
        ntfn: TagNotification,
    ) -> Result<Response, ClientError> {
        self.single(Request::SendTagNotification {
            tag_id: tag_id.map(ToOwned::to_owned),
            ntfn,
        })
    }
}
