use time::OffsetDateTime;

use inventory_cache_sdk::{Customer, CustomerPatch, EntityId, InventoryError, NewCustomer};

use crate::domain::entities::{require, require_if_set};
use crate::domain::entity::{CacheEntity, UniqueValue};
use crate::domain::store::{EntityStore, StoreLayout, UniqueIndexDef};

/// Uniqueness indexes. Customer names may repeat; email and phone may not.
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";

impl CacheEntity for Customer {
    type Create = NewCustomer;
    type Patch = CustomerPatch;

    const KIND: &'static str = "customer";

    fn id(&self) -> EntityId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn mark_deleted(&mut self, at: OffsetDateTime) {
        self.is_deleted = true;
        self.deleted_at = Some(at);
        self.updated_at = at;
    }

    fn mark_restored(&mut self, at: OffsetDateTime) {
        self.is_deleted = false;
        self.deleted_at = None;
        self.updated_at = at;
    }

    fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }

    fn search_text(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        if let Some(email) = &self.email {
            out.push(email);
        }
        if let Some(phone) = &self.phone {
            out.push(phone);
        }
        out
    }

    fn layout() -> StoreLayout<Self> {
        StoreLayout {
            unique: vec![
                UniqueIndexDef {
                    name: EMAIL,
                    key: |c: &Self| c.email.clone(),
                },
                UniqueIndexDef {
                    name: PHONE,
                    key: |c: &Self| c.phone.clone(),
                },
            ],
            groups: Vec::new(),
        }
    }

    fn validate_create(create: &NewCustomer) -> Result<(), InventoryError> {
        require("name", &create.name)?;
        require_if_set("email", create.email.as_ref())?;
        require_if_set("phone", create.phone.as_ref())
    }

    fn validate_patch(patch: &CustomerPatch) -> Result<(), InventoryError> {
        if let Some(name) = &patch.name {
            require("name", name)?;
        }
        if let Some(email) = &patch.email {
            require_if_set("email", email.as_ref())?;
        }
        if let Some(phone) = &patch.phone {
            require_if_set("phone", phone.as_ref())?;
        }
        Ok(())
    }

    fn create_unique_values(create: &NewCustomer) -> Vec<UniqueValue> {
        let mut out = Vec::new();
        if let Some(email) = &create.email {
            out.push((EMAIL, email.clone()));
        }
        if let Some(phone) = &create.phone {
            out.push((PHONE, phone.clone()));
        }
        out
    }

    fn patch_unique_values(patch: &CustomerPatch) -> Vec<UniqueValue> {
        let mut out = Vec::new();
        if let Some(Some(email)) = &patch.email {
            out.push((EMAIL, email.clone()));
        }
        if let Some(Some(phone)) = &patch.phone {
            out.push((PHONE, phone.clone()));
        }
        out
    }

    fn apply_patch(&self, patch: &CustomerPatch, now: OffsetDateTime) -> Self {
        let mut out = self.clone();
        if let Some(name) = &patch.name {
            out.name = name.clone();
        }
        if let Some(email) = &patch.email {
            out.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            out.phone = phone.clone();
        }
        if let Some(address) = &patch.address {
            out.address = address.clone();
        }
        out.updated_at = now;
        out
    }

    fn from_create(id: EntityId, create: &NewCustomer, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: create.name.clone(),
            email: create.email.clone(),
            phone: create.phone.clone(),
            address: create.address.clone(),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl EntityStore<Customer> {
    #[must_use]
    pub fn get_by_email(&self, email: &str) -> Option<Customer> {
        self.get_by_unique(EMAIL, email)
    }

    #[must_use]
    pub fn get_by_phone(&self, phone: &str) -> Option<Customer> {
        self.get_by_unique(PHONE, phone)
    }

    #[must_use]
    pub fn email_exists(&self, email: &str, exclude: Option<EntityId>) -> bool {
        self.unique_exists(EMAIL, email, exclude)
    }

    #[must_use]
    pub fn phone_exists(&self, phone: &str, exclude: Option<EntityId>) -> bool {
        self.unique_exists(PHONE, phone, exclude)
    }
}
