use limbcurriculum::data::{GenomeFileName, GenomeStore};
use limbcurriculum::engines::generation::{Genome, InterfaceLayout};
use limbcurriculum::types::CurriculumMode;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

fn elites(count: usize, segments: usize) -> Vec<Genome> {
    let mut rng = StdRng::seed_from_u64(21);
    let arity = InterfaceLayout::arity_for(segments, 5);
    (0..count).map(|_| Genome::minimal(arity, &mut rng)).collect()
}

fn file_names(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_save_stage_then_load() {
    let dir = TempDir::new().unwrap();
    let store = GenomeStore::new(dir.path().join("models"));
    let genomes = elites(3, 2);

    let paths = store
        .save_stage(&genomes, 2, None, CurriculumMode::Curriculum)
        .unwrap();

    assert_eq!(paths.len(), 3);
    for (genome, path) in genomes.iter().zip(&paths) {
        assert_eq!(&GenomeStore::load(path).unwrap(), genome);
    }
}

#[test]
fn test_file_names_carry_run_index_and_mode() {
    let dir = TempDir::new().unwrap();
    let store = GenomeStore::new(dir.path());
    let genomes = elites(2, 1);

    store.save_stage(&genomes, 1, Some(3), CurriculumMode::Curriculum).unwrap();
    store.save_stage(&genomes[..1], 1, None, CurriculumMode::Direct).unwrap();

    assert_eq!(
        file_names(&dir),
        vec![
            "best_0_genome_1_seg_direct.json",
            "best_0_genome_1_seg_nr3.json",
            "best_1_genome_1_seg_nr3.json",
        ]
    );
    for name in file_names(&dir) {
        let parsed = GenomeFileName::parse(&name).unwrap();
        assert_eq!(parsed.segment_count, 1);
        assert_eq!(parsed.to_string(), name);
    }
}

#[test]
fn test_load_rejects_corrupt_genome() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("best_0_genome_1_seg.json");

    std::fs::write(&path, "{ not json").unwrap();
    assert!(GenomeStore::load(&path).is_err());

    assert!(GenomeStore::load(dir.path().join("missing.json")).is_err());
}
