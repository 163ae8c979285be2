//! Integration tests for the catalog module

#[cfg(test)]
mod integration_tests {
    use crate::catalog::{reconcile, scan_archives, CatalogEntry, CatalogRow, CatalogStore};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    /// A catalog read from disk, reconciled against a mods directory with a
    /// version bump and a new archive, then written back
    #[test]
    fn test_reload_cycle_through_store() {
        let temp_dir = TempDir::new().unwrap();
        let mods_dir = temp_dir.path().join("mods");
        std::fs::create_dir_all(&mods_dir).unwrap();
        for name in ["sodium-0.5.8.jar", "iris-1.6.4.jar", "readme.txt"] {
            std::fs::write(mods_dir.join(name), name).unwrap();
        }

        let catalog = temp_dir.path().join("modlist.csv");
        std::fs::write(
            &catalog,
            "filename;slug;modrinth_title;modrinth_project_url;client_side;server_side\n\
             sodium-0.5.3.jar;sodium;Sodium;https://modrinth.com/mod/sodium;required;unsupported\n",
        )
        .unwrap();

        let store = CatalogStore::new(&catalog);
        let rows = store.read_rows().unwrap();
        let archives = scan_archives(&mods_dir, "jar").unwrap();
        let result = reconcile(&rows, &archives);

        assert_eq!(result.updated, 1);
        assert_eq!(result.added, 1);
        assert_eq!(
            result.rows,
            vec![
                CatalogRow::new("sodium-0.5.8.jar", "sodium"),
                CatalogRow::new("iris-1.6.4.jar", ""),
            ]
        );

        let entries: Vec<CatalogEntry> = result.rows.iter().map(CatalogEntry::unenriched).collect();
        store.write(&entries).unwrap();

        let reread = store.read_rows().unwrap();
        // Written back sorted by filename
        assert_eq!(reread[0].filename, "iris-1.6.4.jar");
        assert_eq!(reread[1], CatalogRow::new("sodium-0.5.8.jar", "sodium"));
    }
}
