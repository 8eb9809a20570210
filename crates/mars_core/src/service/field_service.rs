//! Deployed-unit use-case service.
//!
//! # Responsibility
//! - Register units at customer sites and move them between customers.
//! - Render unit labels for logs and UI callers.

use crate::model::customer::CustomerId;
use crate::model::device::DeviceId;
use crate::model::device_in_field::{DeviceInField, DeviceInFieldId, NewDeviceInField};
use crate::model::record::RecordKind;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::field_repo::{DeviceInFieldListQuery, DeviceInFieldRepository};
use log::info;

pub struct FieldService<F: DeviceInFieldRepository> {
    repo: F,
}

impl<F: DeviceInFieldRepository> FieldService<F> {
    pub fn new(repo: F) -> Self {
        Self { repo }
    }

    /// Records a unit of catalog device `analyzer_id` at `customer_id`.
    pub fn register_unit(
        &self,
        serial_number: impl Into<String>,
        customer_id: CustomerId,
        analyzer_id: DeviceId,
        owner_status: impl Into<String>,
    ) -> RepoResult<DeviceInField> {
        let unit = NewDeviceInField::new(serial_number, customer_id, analyzer_id, owner_status);
        let created = self.repo.create_device_in_field(&unit)?;
        info!(
            "event=unit_register module=service status=ok unit_id={} customer_id={} analyzer_id={}",
            created.id, created.customer_id, created.analyzer_id
        );
        Ok(created)
    }

    /// Moves a unit to another customer site.
    pub fn relocate_unit(
        &self,
        id: DeviceInFieldId,
        customer_id: CustomerId,
    ) -> RepoResult<DeviceInField> {
        self.modify(id, |unit| unit.customer_id = customer_id)
    }

    /// Replaces the free-text ownership status.
    pub fn set_owner_status(
        &self,
        id: DeviceInFieldId,
        owner_status: impl Into<String>,
    ) -> RepoResult<DeviceInField> {
        let owner_status = owner_status.into();
        self.modify(id, |unit| unit.owner_status = owner_status)
    }

    pub fn get_unit(&self, id: DeviceInFieldId) -> RepoResult<Option<DeviceInField>> {
        self.repo.get_device_in_field(id)
    }

    /// Lists every unit installed at one customer.
    pub fn units_for_customer(&self, customer_id: CustomerId) -> RepoResult<Vec<DeviceInField>> {
        self.repo.list_devices_in_field(&DeviceInFieldListQuery {
            customer_id: Some(customer_id),
            ..DeviceInFieldListQuery::default()
        })
    }

    pub fn unit_label(&self, id: DeviceInFieldId) -> RepoResult<String> {
        self.repo
            .device_in_field_label(id)?
            .ok_or(RepoError::NotFound {
                kind: RecordKind::DeviceInField,
                id,
            })
    }

    pub fn remove_unit(&self, id: DeviceInFieldId) -> RepoResult<()> {
        self.repo.delete_device_in_field(id)
    }

    fn modify(
        &self,
        id: DeviceInFieldId,
        apply: impl FnOnce(&mut DeviceInField),
    ) -> RepoResult<DeviceInField> {
        let mut unit = self
            .repo
            .get_device_in_field(id)?
            .ok_or(RepoError::NotFound {
                kind: RecordKind::DeviceInField,
                id,
            })?;
        apply(&mut unit);
        self.repo.update_device_in_field(&unit)?;
        Ok(unit)
    }
}
