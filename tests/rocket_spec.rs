use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rocket_catalog::models::*;
use rocket_catalog::ModelError;
use speculate2::speculate;
use uuid::Uuid;

fn provider(name: &str) -> Arc<LaunchServiceProvider> {
    Arc::new(LaunchServiceProvider {
        id: Uuid::new_v4(),
        name: name.to_string(),
        year_founded: 2002,
        country: "USA".to_string(),
        headquarters: None,
    })
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn is_invalid(result: Result<(), ModelError>, field: &str) -> bool {
    matches!(result, Err(ModelError::InvalidArgument { field: f, .. }) if f == field)
}

speculate! {
    before {
        let spacex = provider("SpaceX");
        let mut rocket = Rocket::new("Falcon 9", "USA", spacex.clone())
            .expect("Failed to create rocket");
    }

    describe "construction" {
        it "starts with an empty launch set and unset optional fields" {
            assert_eq!(rocket.name(), "Falcon 9");
            assert_eq!(rocket.country(), "USA");
            assert_eq!(rocket.manufacturer(), &spacex);
            assert!(rocket.launches().is_empty());
            assert!(rocket.mass_to_leo().is_none());
            assert!(rocket.mass_to_gto().is_none());
            assert!(rocket.mass_to_other().is_none());
            assert!(rocket.first_year_flight().is_none());
            assert!(rocket.latest_year_flight().is_none());
            assert!(rocket.family().is_none());
        }

        it "rejects a missing name" {
            let err = Rocket::new("", "USA", spacex.clone()).unwrap_err();
            assert_eq!(err.field(), "name");
        }

        it "rejects a missing country" {
            let err = Rocket::new("Falcon 9", "  ", spacex.clone()).unwrap_err();
            assert_eq!(err.field(), "country");
        }

        it "rejects a draft without a manufacturer" {
            let mut draft = RocketDraft::new();
            draft.set_name("Falcon 9");
            draft.set_country("USA");
            let err = draft.build().unwrap_err();
            assert_eq!(err.field(), "manufacturer");
        }

        it "treats a blank draft name as absent" {
            let mut draft = RocketDraft::new();
            draft.set_name("   ");
            draft.set_country("USA");
            draft.set_manufacturer(spacex.clone());
            let err = draft.build().unwrap_err();
            assert_eq!(err.field(), "name");
        }

        it "rejects an empty draft starting with the name" {
            let err = RocketDraft::default().build().unwrap_err();
            assert_eq!(err.field(), "name");
        }
    }

    describe "mass setters" {
        it "stores a numeric mass unchanged" {
            rocket.set_mass_to_leo("22800").expect("Failed to set mass");
            assert_eq!(rocket.mass_to_leo(), Some("22800"));

            rocket.set_mass_to_gto("8,300 kg").expect("Failed to set mass");
            assert_eq!(rocket.mass_to_gto(), Some("8,300 kg"));
        }

        it "rejects empty values" {
            assert!(is_invalid(rocket.set_mass_to_leo(""), "mass_to_leo"));
            assert!(is_invalid(rocket.set_mass_to_gto(""), "mass_to_gto"));
            assert!(is_invalid(rocket.set_mass_to_other(""), "mass_to_other"));
        }

        it "rejects whitespace-only values" {
            assert!(is_invalid(rocket.set_mass_to_leo(" \t"), "mass_to_leo"));
            assert!(is_invalid(rocket.set_mass_to_gto("\n"), "mass_to_gto"));
            assert!(is_invalid(rocket.set_mass_to_other("   "), "mass_to_other"));
        }

        it "rejects non-numeric values" {
            assert!(is_invalid(rocket.set_mass_to_leo("heavy"), "mass_to_leo"));
            assert!(is_invalid(rocket.set_mass_to_gto("abc"), "mass_to_gto"));
            assert!(is_invalid(rocket.set_mass_to_other("n/a"), "mass_to_other"));
        }

        it "rejects digits outside ASCII" {
            assert!(is_invalid(rocket.set_mass_to_leo("٢٢٨٠٠"), "mass_to_leo"));
            assert!(is_invalid(rocket.set_mass_to_gto("２２８００"), "mass_to_gto"));
            assert!(rocket.mass_to_leo().is_none());
        }

        it "keeps the previous value after a rejected call" {
            rocket.set_mass_to_leo("22800").expect("Failed to set mass");
            assert!(rocket.set_mass_to_leo("").is_err());
            assert!(rocket.set_mass_to_leo("heavy").is_err());
            assert_eq!(rocket.mass_to_leo(), Some("22800"));
        }
    }

    describe "set_family" {
        it "rejects an absent family" {
            assert!(is_invalid(rocket.set_family(None), "family"));
            assert!(rocket.family().is_none());
        }

        it "stores a family" {
            let family = RocketFamily { id: Uuid::new_v4(), name: "Falcon".to_string() };
            rocket.set_family(family.clone()).expect("Failed to set family");
            assert_eq!(rocket.family(), Some(&family));
        }
    }

    describe "flight years" {
        it "accepts any pair of years" {
            rocket.set_first_year_flight(2010);
            rocket.set_latest_year_flight(2008);
            assert_eq!(rocket.first_year_flight(), Some(2010));
            assert_eq!(rocket.latest_year_flight(), Some(2008));
        }
    }

    describe "identity setters" {
        it "renames the rocket" {
            rocket.set_name("Falcon Heavy").expect("Failed to rename");
            rocket.set_country("United States").expect("Failed to set country");
            assert_eq!(rocket.name(), "Falcon Heavy");
            assert_eq!(rocket.country(), "United States");
        }

        it "rejects blank name and country like the constructor" {
            assert!(is_invalid(rocket.set_name(""), "name"));
            assert!(is_invalid(rocket.set_country(" "), "country"));
            assert_eq!(rocket.name(), "Falcon 9");
            assert_eq!(rocket.country(), "USA");
        }
    }

    describe "equality" {
        it "treats rockets with the same key as equal regardless of other fields" {
            let mut other = Rocket::new("Falcon 9", "USA", spacex.clone())
                .expect("Failed to create rocket");
            rocket.set_mass_to_leo("22800").expect("Failed to set mass");
            other.set_mass_to_leo("15600").expect("Failed to set mass");
            other.set_first_year_flight(2010);

            assert_eq!(rocket, other);
            assert_eq!(hash_of(&rocket), hash_of(&other));
        }

        it "breaks equality when the manufacturer changes" {
            let mut other = Rocket::new("Falcon 9", "USA", spacex.clone())
                .expect("Failed to create rocket");
            assert_eq!(rocket, other);

            other.set_manufacturer(provider("SpaceX Holdings"));
            assert_ne!(rocket, other);
        }

        it "differs when the country differs" {
            let other = Rocket::new("Falcon 9", "Canada", spacex.clone())
                .expect("Failed to create rocket");
            assert_ne!(rocket, other);
        }
    }

    describe "falcon 9 scenario" {
        it "validates masses and compares by key" {
            assert!(rocket.set_mass_to_leo("22800").is_ok());
            assert_eq!(rocket.mass_to_leo(), Some("22800"));
            assert!(rocket.set_mass_to_leo("").is_err());
            assert!(rocket.set_mass_to_leo("heavy").is_err());

            let second = Rocket::new("Falcon 9", "USA", spacex.clone())
                .expect("Failed to create rocket");
            assert_eq!(rocket, second);
        }
    }
}
