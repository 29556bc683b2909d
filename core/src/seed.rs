//! Default catalog contents for a fresh installation.

use crate::catalog::{CatalogAdmin, CatalogError};
use crate::types::VehicleDraft;

/// Service types offered out of the box.
pub const SERVICE_TYPES: [&str; 6] = [
    "Airport Transfer",
    "Point to Point",
    "Hourly / Charter",
    "Wedding Service",
    "Prom / Graduation",
    "Corporate Event",
];

struct VehicleSeed {
    name: &'static str,
    category: &'static str,
    image: &'static str,
    passengers: u32,
    luggage: u32,
    description: &'static str,
}

const VEHICLES: [VehicleSeed; 6] = [
    VehicleSeed {
        name: "Executive Sedan",
        category: "Business Class",
        image: "https://images.unsplash.com/photo-1552519507-da3b142c6e3d?q=80&w=2070&auto=format&fit=crop",
        passengers: 3,
        luggage: 3,
        description: "Elegant BMW 7 Series or Lincoln Continental for sophisticated city travel.",
    },
    VehicleSeed {
        name: "Luxury SUV",
        category: "Elite Comfort",
        image: "https://images.unsplash.com/photo-1533473359331-0135ef1b58bf?q=80&w=2070&auto=format&fit=crop",
        passengers: 6,
        luggage: 6,
        description: "Cadillac Escalade or GMC Yukon XL offering spacious, premium travel.",
    },
    VehicleSeed {
        name: "Tesla Model S",
        category: "Eco-Luxury",
        image: "https://images.unsplash.com/photo-1560958089-b8a1929cea89?q=80&w=2071&auto=format&fit=crop",
        passengers: 3,
        luggage: 3,
        description: "Zero-emission, silent, and cutting-edge luxury at our standard rates.",
    },
    VehicleSeed {
        name: "Stretch Limousine",
        category: "Classic Luxury",
        image: "https://images.unsplash.com/photo-1511210352396-54a060633c32?q=80&w=2114&auto=format&fit=crop",
        passengers: 8,
        luggage: 4,
        description: "The ultimate statement for weddings, proms, and gala events.",
    },
    VehicleSeed {
        name: "Mercedes Sprinter",
        category: "Group Travel",
        image: "https://images.unsplash.com/photo-1544620347-c4fd4a3d5947?q=80&w=2070&auto=format&fit=crop",
        passengers: 14,
        luggage: 14,
        description: "Premium group transportation with ample space for luggage and comfort.",
    },
    VehicleSeed {
        name: "SUV Stretch Limo",
        category: "Party Elite",
        image: "https://images.unsplash.com/photo-1544620347-c4fd4a3d5947?q=80&w=2070&auto=format&fit=crop",
        passengers: 16,
        luggage: 8,
        description: "Massive presence and ultra-luxury interior for the biggest occasions.",
    },
];

impl VehicleSeed {
    fn draft(&self) -> VehicleDraft {
        VehicleDraft {
            name: self.name.to_string(),
            category: self.category.to_string(),
            image: self.image.to_string(),
            passengers: self.passengers,
            luggage: self.luggage,
            description: self.description.to_string(),
        }
    }
}

/// Counts from one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Entries inserted
    pub created: usize,
    /// Vehicles whose image was pointed back at the default
    pub refreshed: usize,
    /// Entries already present and left alone
    pub unchanged: usize,
}

/// Images that pointed at the old local upload directory.
fn is_local_upload(image: &str) -> bool {
    image.starts_with("/uploads/") || image.contains("railway.app/uploads/")
}

/// Insert any missing default catalog entries. Safe to run repeatedly.
///
/// # Errors
///
/// Propagates the first [`CatalogError`].
pub async fn seed_catalog(catalog: &dyn CatalogAdmin) -> Result<SeedReport, CatalogError> {
    let mut report = SeedReport::default();

    for name in SERVICE_TYPES {
        if catalog.service_type_named(name).await?.is_some() {
            report.unchanged += 1;
        } else {
            catalog.create_service_type(name.to_string()).await?;
            tracing::info!(name, "seeded service type");
            report.created += 1;
        }
    }

    for seed in &VEHICLES {
        match catalog.vehicle_preference_named(seed.name).await? {
            None => {
                catalog.create_vehicle_preference(seed.draft()).await?;
                tracing::info!(name = seed.name, "seeded vehicle");
                report.created += 1;
            }
            Some(existing) if is_local_upload(&existing.image) => {
                let draft = VehicleDraft {
                    image: seed.image.to_string(),
                    name: existing.name,
                    category: existing.category,
                    passengers: existing.passengers,
                    luggage: existing.luggage,
                    description: existing.description,
                };
                catalog.update_vehicle_preference(existing.id, draft).await?;
                tracing::info!(name = seed.name, "restored default vehicle image");
                report.refreshed += 1;
            }
            Some(_) => report.unchanged += 1,
        }
    }

    Ok(report)
}
