#[cfg(test)]
mod tests {
    use crate::analyzer::CollisionAnalyzer;
    use crate::war::WarBundle;
    use classclash_common::{
        ArchivePairKey, Bundle, ClashError, ComparableUnit, LibraryArchive, Vfs, VfsError,
    };
    use std::fs;
    use std::io::{Cursor, Read, Write};
    use std::path::Path;
    use tempfile::TempDir;

    fn build_jar(classes: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            let options = zip::write::FileOptions::default();
            zip.start_file("META-INF/MANIFEST.MF", options).expect("Failed to start file");
            zip.write_all(b"Manifest-Version: 1.0\n").expect("Failed to write");
            for (name, body) in classes {
                zip.start_file(*name, options).expect("Failed to start file");
                zip.write_all(body.as_bytes()).expect("Failed to write");
            }
            zip.finish().expect("Failed to finish jar");
        }
        buf.into_inner()
    }

    fn write_war(path: &Path, classes: &[(&str, &str)], jars: &[(&str, Vec<u8>)]) {
        let file = fs::File::create(path).expect("Failed to create war");
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        zip.add_directory("WEB-INF/", options).expect("Failed to add directory");
        for (name, body) in classes {
            zip.start_file(format!("WEB-INF/classes/{name}"), options)
                .expect("Failed to start file");
            zip.write_all(body.as_bytes()).expect("Failed to write");
        }
        for (name, bytes) in jars {
            zip.start_file(format!("WEB-INF/lib/{name}"), options)
                .expect("Failed to start file");
            zip.write_all(bytes).expect("Failed to write");
        }
        zip.start_file("index.html", options).expect("Failed to start file");
        zip.write_all(b"<html/>").expect("Failed to write");
        zip.finish().expect("Failed to finish war");
    }

    fn write_exploded(root: &Path, classes: &[(&str, &str)], jars: &[(&str, Vec<u8>)]) {
        for (name, body) in classes {
            let path = root.join("WEB-INF/classes").join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        fs::create_dir_all(root.join("WEB-INF/lib")).unwrap();
        for (name, bytes) in jars {
            fs::write(root.join("WEB-INF/lib").join(name), bytes).unwrap();
        }
    }

    /// One stored entry whose central directory claims a zip64 size of 2^60
    fn forged_size_zip(name: &str, data: &[u8]) -> Vec<u8> {
        let name = name.as_bytes();
        let mut out = Vec::new();

        // local file header
        out.extend_from_slice(&0x04034b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x21u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(data);

        // central directory header
        let cd_offset = out.len() as u32;
        out.extend_from_slice(&0x02014b50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x21u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&u32::MAX.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&12u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&(1u64 << 60).to_le_bytes());
        let cd_size = out.len() as u32 - cd_offset;

        // end of central directory
        out.extend_from_slice(&0x06054b50u32.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    fn read_all(mut reader: Box<dyn Read + Send>) -> Vec<u8> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).unwrap();
        data
    }

    #[test]
    fn test_war_bundle_lists_classes_and_jars() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(&[("org/lib/Util.class", "util"), ("org/lib/Io.class", "io")]);
        let war = temp.path().join("app.war");
        write_war(
            &war,
            &[("com/x/Main.class", "main"), ("app.properties", "k=v")],
            &[("util-1.0.jar", jar.clone())],
        );

        let bundle = WarBundle::open(&war).unwrap();
        assert_eq!(bundle.units().len(), 1);
        assert_eq!(bundle.units()[0].canonical_name(), "com.x.Main");
        assert_eq!(read_all(bundle.units()[0].open_stream().unwrap()), b"main");

        assert_eq!(bundle.archives().len(), 1);
        let archive = &bundle.archives()[0];
        assert_eq!(archive.name(), "util-1.0.jar");
        let names: Vec<&str> = archive.units().iter().map(|u| u.canonical_name()).collect();
        assert_eq!(names, vec!["org.lib.Util", "org.lib.Io"]);

        // streams are re-openable
        let util = &archive.units()[0];
        assert_eq!(read_all(util.open_stream().unwrap()), b"util");
        assert_eq!(read_all(util.open_stream().unwrap()), b"util");
        assert_eq!(read_all(archive.open_stream().unwrap()), jar);
    }

    #[test]
    fn test_exploded_war_matches_packed_war() {
        let temp = TempDir::new().unwrap();
        let jar = build_jar(&[("org/lib/Util.class", "util")]);
        let classes = [("com/x/Main.class", "main"), ("com/x/sub/Helper.class", "helper")];
        let jars = [("util-1.0.jar", jar)];

        let packed = temp.path().join("app.war");
        write_war(&packed, &classes, &jars);
        let exploded = temp.path().join("exploded");
        write_exploded(&exploded, &classes, &jars);

        let packed = WarBundle::open(&packed).unwrap();
        let exploded = WarBundle::open(&exploded).unwrap();

        let mut packed_names: Vec<&str> = packed.units().iter().map(|u| u.canonical_name()).collect();
        let mut exploded_names: Vec<&str> = exploded.units().iter().map(|u| u.canonical_name()).collect();
        packed_names.sort();
        exploded_names.sort();
        assert_eq!(packed_names, exploded_names);
        assert_eq!(exploded.archives()[0].name(), "util-1.0.jar");
    }

    #[test]
    fn test_missing_path() {
        let err = WarBundle::open(Path::new("/nonexistent/classclash/app.war")).err().unwrap();
        assert!(matches!(err, ClashError::Path(_)));
    }

    #[test]
    fn test_corrupt_nested_jar_is_fatal() {
        let temp = TempDir::new().unwrap();
        let war = temp.path().join("app.war");
        write_war(&war, &[], &[("broken.jar", b"not a zip".to_vec())]);

        let err = WarBundle::open(&war).err().unwrap();
        assert!(matches!(err, ClashError::Vfs(VfsError::InvalidArchive(_, _))));
    }

    #[test]
    fn test_declared_size_is_not_trusted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("forged.war");
        fs::write(&path, forged_size_zip("WEB-INF/lib/x.jar", b"not really a jar")).unwrap();

        let vfs = crate::vfs::ZipVfs::new(path.clone()).unwrap();
        assert_eq!(vfs.list_files().unwrap()[0].size, 1u64 << 60);
        let bytes = read_all(vfs.open_file(Path::new("WEB-INF/lib/x.jar")).unwrap());
        assert_eq!(bytes, b"not really a jar");

        let err = WarBundle::open(&path).err().unwrap();
        assert!(matches!(err, ClashError::Vfs(VfsError::InvalidArchive(_, _))));
    }

    #[test]
    fn test_nested_jar_outlives_bundle() {
        let temp = TempDir::new().unwrap();
        let war = temp.path().join("app.war");
        let jar = build_jar(&[("org/lib/Util.class", "util")]);
        write_war(&war, &[], &[("util-1.0.jar", jar)]);

        let bundle = WarBundle::open(&war).unwrap();
        let archive = bundle.archives()[0].clone();
        drop(bundle);

        assert_eq!(read_all(archive.units()[0].open_stream().unwrap()), b"util");
    }

    #[test]
    fn test_top_level_vs_archive_is_other_collision() {
        let temp = TempDir::new().unwrap();
        let lib = build_jar(&[("com/x/Foo.class", "jar-foo")]);
        let left = temp.path().join("left.war");
        let right = temp.path().join("right.war");
        write_war(&left, &[("com/x/Foo.class", "war-foo")], &[]);
        write_war(&right, &[], &[("lib-1.0.jar", lib)]);

        let result = CollisionAnalyzer::default()
            .analyze(&WarBundle::open(&left).unwrap(), &WarBundle::open(&right).unwrap())
            .unwrap();

        assert_eq!(result.other_collisions.len(), 1);
        assert_eq!(result.other_collisions[0].name(), "com.x.Foo");
        assert!(result.identical_archive_pairs.is_empty());
        assert!(result.identical_content_in_differing_archives.is_empty());
        assert!(result.true_collisions_in_archives.is_empty());
    }

    #[test]
    fn test_identical_shared_jar() {
        let temp = TempDir::new().unwrap();
        let shared = build_jar(&[("s/A.class", "a"), ("s/B.class", "b")]);
        let left = temp.path().join("left.war");
        let right = temp.path().join("right.war");
        write_war(&left, &[("com/l/Main.class", "l")], &[("shared.jar", shared.clone())]);
        write_war(&right, &[("com/r/Main.class", "r")], &[("shared.jar", shared)]);

        let result = CollisionAnalyzer::default()
            .analyze(&WarBundle::open(&left).unwrap(), &WarBundle::open(&right).unwrap())
            .unwrap();

        let key = ArchivePairKey::new("shared.jar", "shared.jar");
        assert!(result.identical_archive_pairs.contains(&key));
        assert!(!result.identical_content_in_differing_archives.contains_key(&key));
        assert!(!result.true_collisions_in_archives.contains_key(&key));
        assert_eq!(result.superseded[&key], 2);
        assert!(!result.has_blocking_collisions());
    }

    #[test]
    fn test_differing_jars_split_per_class() {
        let temp = TempDir::new().unwrap();
        let a = build_jar(&[
            ("p/Same1.class", "same-1"),
            ("p/Same2.class", "same-2"),
            ("p/Diff.class", "left"),
            ("p/OnlyA1.class", "x"),
            ("p/OnlyA2.class", "y"),
        ]);
        let b = build_jar(&[
            ("p/Same1.class", "same-1"),
            ("p/Same2.class", "same-2"),
            ("p/Diff.class", "right"),
            ("p/OnlyB1.class", "x"),
            ("p/OnlyB2.class", "y"),
        ]);
        let left = temp.path().join("left.war");
        let right = temp.path().join("right.war");
        write_war(&left, &[], &[("a.jar", a)]);
        write_war(&right, &[], &[("b.jar", b)]);

        let result = CollisionAnalyzer::default()
            .analyze(&WarBundle::open(&left).unwrap(), &WarBundle::open(&right).unwrap())
            .unwrap();

        let key = ArchivePairKey::new("a.jar", "b.jar");
        assert_eq!(result.identical_content_in_differing_archives[&key].len(), 2);
        assert_eq!(result.true_collisions_in_archives[&key].len(), 1);

        let reports = result.archive_pair_reports(0.75);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].left_units, 5);
        assert!(!reports[0].same_artifact);
        assert!(result.summary().is_complete());
    }

    #[test]
    fn test_vfs_trait_object_usable() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("exploded");
        write_exploded(&root, &[("a/A.class", "a")], &[]);
        let vfs: std::sync::Arc<dyn Vfs> =
            std::sync::Arc::new(crate::vfs::LocalVfs::new(root.clone()));
        let bundle = WarBundle::from_vfs(vfs, "exploded").unwrap();
        assert_eq!(bundle.display_name(), "exploded");
        assert_eq!(bundle.units()[0].canonical_name(), "a.A");
        assert!(bundle.archives().is_empty());
    }
}
