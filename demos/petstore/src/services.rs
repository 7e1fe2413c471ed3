use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{NewPet, Owner, Pet};

#[derive(Clone, Default)]
pub struct PetService {
    pets: Arc<RwLock<Vec<Pet>>>,
}

impl PetService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<Pet> {
        self.pets.read().await.clone()
    }

    pub async fn get_by_id(&self, id: i64) -> Option<Pet> {
        self.pets.read().await.iter().find(|p| p.id == id).cloned()
    }

    pub async fn create(&self, new: NewPet) -> Pet {
        let mut pets = self.pets.write().await;
        let id = pets.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let owner = new.owner_email.map(|email| Owner {
            name: email.split('@').next().unwrap_or_default().to_string(),
            email: Some(email),
            status: "active".into(),
            password_hash: String::new(),
        });
        let pet = Pet {
            id,
            name: new.name,
            birthday: new.birthday,
            owner,
            toys: Vec::new(),
            kind: new.kind,
        };
        pets.push(pet.clone());
        pet
    }

    /// Returns whether a pet was removed.
    pub async fn delete(&self, id: i64) -> bool {
        let mut pets = self.pets.write().await;
        let before = pets.len();
        pets.retain(|p| p.id != id);
        pets.len() != before
    }
}
