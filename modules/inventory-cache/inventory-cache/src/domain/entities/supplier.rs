use time::OffsetDateTime;

use inventory_cache_sdk::{EntityId, InventoryError, NewSupplier, Supplier, SupplierPatch};

use crate::domain::entities::{require, require_if_set};
use crate::domain::entity::{CacheEntity, UniqueValue};
use crate::domain::store::{EntityStore, StoreLayout, UniqueIndexDef};

/// Uniqueness indexes. Supplier names are unique within the active
/// partition, alongside contact email and phone.
pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";

impl CacheEntity for Supplier {
    type Create = NewSupplier;
    type Patch = SupplierPatch;

    const KIND: &'static str = "supplier";

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
        if let Some(contact) = &self.contact_person {
            out.push(contact);
        }
        out
    }

    fn layout() -> StoreLayout<Self> {
        StoreLayout {
            unique: vec![
                UniqueIndexDef {
                    name: NAME,
                    key: |s: &Self| Some(s.name.clone()),
                },
                UniqueIndexDef {
                    name: EMAIL,
                    key: |s: &Self| s.email.clone(),
                },
                UniqueIndexDef {
                    name: PHONE,
                    key: |s: &Self| s.phone.clone(),
                },
            ],
            groups: Vec::new(),
        }
    }

    fn validate_create(create: &NewSupplier) -> Result<(), InventoryError> {
        require("name", &create.name)?;
        require_if_set("email", create.email.as_ref())?;
        require_if_set("phone", create.phone.as_ref())
    }

    fn validate_patch(patch: &SupplierPatch) -> Result<(), InventoryError> {
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

    fn create_unique_values(create: &NewSupplier) -> Vec<UniqueValue> {
        let mut out = vec![(NAME, create.name.clone())];
        if let Some(email) = &create.email {
            out.push((EMAIL, email.clone()));
        }
        if let Some(phone) = &create.phone {
            out.push((PHONE, phone.clone()));
        }
        out
    }

    fn patch_unique_values(patch: &SupplierPatch) -> Vec<UniqueValue> {
        let mut out = Vec::new();
        if let Some(name) = &patch.name {
            out.push((NAME, name.clone()));
        }
        if let Some(Some(email)) = &patch.email {
            out.push((EMAIL, email.clone()));
        }
        if let Some(Some(phone)) = &patch.phone {
            out.push((PHONE, phone.clone()));
        }
        out
    }

    fn apply_patch(&self, patch: &SupplierPatch, now: OffsetDateTime) -> Self {
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
        if let Some(contact) = &patch.contact_person {
            out.contact_person = contact.clone();
        }
        out.updated_at = now;
        out
    }

    fn from_create(id: EntityId, create: &NewSupplier, now: OffsetDateTime) -> Self {
        Self {
            id,
            name: create.name.clone(),
            email: create.email.clone(),
            phone: create.phone.clone(),
            address: create.address.clone(),
            contact_person: create.contact_person.clone(),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl EntityStore<Supplier> {
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Supplier> {
        self.get_by_unique(NAME, name)
    }

    #[must_use]
    pub fn get_by_email(&self, email: &str) -> Option<Supplier> {
        self.get_by_unique(EMAIL, email)
    }

    #[must_use]
    pub fn get_by_phone(&self, phone: &str) -> Option<Supplier> {
        self.get_by_unique(PHONE, phone)
    }

    #[must_use]
    pub fn email_exists(&self, email: &str, exclude: Option<EntityId>) -> bool {
        self.unique_exists(EMAIL, email, exclude)
    }
}
