use obj_core::{HASHED_NAME_MAX_BYTES, PathComposer, Settings};
use obj_fs::{NormalizedPath, unescape_name};
use obj_model::TypeCatalog;
use proptest::prelude::*;

fn composer() -> PathComposer {
    PathComposer::from_settings(&Settings::default())
}

proptest! {
    #[test]
    fn compute_is_deterministic(name in "[a-z0-9!:/ ]{1,60}") {
        let catalog = TypeCatalog::builtins();
        let host = catalog.get("Host").unwrap();
        let dir = NormalizedPath::new("/srv/packages/_api/stage");

        let first = composer().compute(&dir, host, &name).unwrap();
        let second = composer().compute(&dir, host, &name).unwrap();
        prop_assert_eq!(&first, &second);

        let stem = first.file_name().unwrap().strip_suffix(".conf").unwrap();
        prop_assert_eq!(unescape_name(stem).unwrap(), name);
    }

    #[test]
    fn hashed_kinds_stay_within_bound(name in "\\PC{1,400}") {
        let catalog = TypeCatalog::builtins();
        for kind in ["Comment", "Downtime"] {
            let derived = composer().derived_name(catalog.get(kind).unwrap(), &name);
            prop_assert!(derived.len() <= HASHED_NAME_MAX_BYTES);
        }
    }
}
