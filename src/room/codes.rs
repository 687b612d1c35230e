use async_trait::async_trait;

/// Source of human-readable room codes. Uniqueness is enforced by the
/// registry, not the generator.
#[async_trait]
pub trait RoomCodeGenerator: Send + Sync {
    async fn generate(&self) -> String;
}

/// Pet name-based room code generator, e.g. `brave-otter`
pub struct PetNameCodeGenerator;

impl PetNameCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PetNameCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomCodeGenerator for PetNameCodeGenerator {
    async fn generate(&self) -> String {
        petname::Petnames::default().generate_one(2, "-")
    }
}
