use rand::Rng;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::game::Game;

/// A level as the rows of its map.
pub type Level = Vec<String>;

/// A collection of Sokoban levels in XSB format.
#[derive(Debug, Clone, Default)]
pub struct Levels {
    levels: Vec<Level>,
}

impl Levels {
    /// Parse XSB-formatted Sokoban levels from a string.
    ///
    /// The XSB format uses:
    /// - Lines starting with `;` as level separators/comments
    /// - Standard Sokoban characters (#, @, $, ., *, +, space)
    /// - Empty lines between levels (optional)
    ///
    /// Every level is checked with the map parser, so a malformed level fails
    /// the whole collection.
    pub fn from_text(contents: &str) -> Result<Self> {
        let mut levels = Vec::new();
        let mut current: Level = Vec::new();

        for line in contents.lines() {
            // Comment lines and blank lines both end the level being read
            if line.trim_start().starts_with(';') || line.trim().is_empty() {
                if !current.is_empty() {
                    levels.push(Self::checked(std::mem::take(&mut current))?);
                }
                continue;
            }
            current.push(line.to_string());
        }

        // Don't forget the last level if file doesn't end with empty line
        if !current.is_empty() {
            levels.push(Self::checked(current)?);
        }

        Ok(Levels { levels })
    }

    /// Parse XSB-formatted Sokoban levels from a text file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    fn checked(level: Level) -> Result<Level> {
        Game::from_rows(&level)?;
        Ok(level)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&[String]> {
        self.levels.get(index).map(Vec::as_slice)
    }

    /// Get the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.levels.iter().map(Vec::as_slice)
    }
}

const BUILTIN: [(&str, &str); 4] = [
    ("tutorial", include_str!("../levels/tutorial.xsb")),
    ("easy", include_str!("../levels/easy.xsb")),
    ("medium", include_str!("../levels/medium.xsb")),
    ("hard", include_str!("../levels/hard.xsb")),
];

/// Read-only levels grouped into named difficulty buckets.
///
/// The catalog never changes once built; callers that want to avoid serving
/// the same level twice pass the previous index back in.
#[derive(Debug, Clone, Default)]
pub struct LevelCatalog {
    buckets: Vec<(String, Levels)>,
}

impl LevelCatalog {
    pub fn new(buckets: Vec<(String, Levels)>) -> Self {
        LevelCatalog { buckets }
    }

    /// The levels bundled with the crate: `tutorial`, `easy`, `medium` and `hard`.
    pub fn builtin() -> Result<Self> {
        let mut buckets = Vec::with_capacity(BUILTIN.len());
        for (name, text) in BUILTIN {
            buckets.push((name.to_string(), Levels::from_text(text)?));
        }
        Ok(LevelCatalog { buckets })
    }

    /// Load every `<name>.xsb` file in `dir` as a bucket called `<name>`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "xsb") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut buckets = Vec::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let levels = Levels::from_file(&path)?;
            tracing::debug!(bucket = name, levels = levels.len(), "Loaded level bucket");
            buckets.push((name.to_string(), levels));
        }
        Ok(LevelCatalog { buckets })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|(name, _)| name.as_str())
    }

    /// Every bucket with its levels, in catalog order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &Levels)> {
        self.buckets
            .iter()
            .map(|(name, levels)| (name.as_str(), levels))
    }

    fn bucket(&self, name: &str) -> Result<&Levels> {
        self.buckets
            .iter()
            .find(|(bucket, _)| bucket == name)
            .map(|(_, levels)| levels)
            .ok_or_else(|| Error::UnknownDifficulty(name.to_string()))
    }

    pub fn count(&self, name: &str) -> Result<usize> {
        Ok(self.bucket(name)?.len())
    }

    /// Get the level at `index` (0-indexed) of bucket `name`.
    pub fn get(&self, name: &str, index: usize) -> Result<&[String]> {
        let levels = self.bucket(name)?;
        levels.get(index).ok_or_else(|| Error::LevelIndex {
            name: name.to_string(),
            level: index + 1,
            total: levels.len(),
        })
    }

    /// Pick a random level of bucket `name`, never `avoid` unless it is the
    /// only level. Returns the 0-indexed position alongside the level.
    pub fn random<R: Rng>(
        &self,
        name: &str,
        avoid: Option<usize>,
        rng: &mut R,
    ) -> Result<(usize, &[String])> {
        let total = self.count(name)?;
        if total == 0 {
            return Err(Error::LevelIndex {
                name: name.to_string(),
                level: 1,
                total,
            });
        }

        let index = match avoid {
            Some(previous) if previous < total && total > 1 => {
                let pick = rng.gen_range(0..total - 1);
                if pick >= previous { pick + 1 } else { pick }
            }
            _ => rng.gen_range(0..total),
        };
        Ok((index, self.get(name, index)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_from_text_basic() {
        let level1 = "####
# .#
#  ###
#*@  #
#  $ #
#  ###
####";

        let level2 = "######
#    #
# #@ #
# $* #
# .* #
#    #
######";

        let level3 = "  ####
###  ####
#     $ #
# #  #$ #
# . .#@ #
#########";

        let xsb_content = format!(
            "; 1\n\n{}\n\n; 2\n\n{}\n\n; 3\n\n{}\n",
            level1, level2, level3
        );

        let levels = Levels::from_text(&xsb_content).unwrap();

        assert_eq!(levels.len(), 3);
        assert_eq!(levels.get(0).unwrap().join("\n"), level1);
        assert_eq!(levels.get(1).unwrap().join("\n"), level2);
        assert_eq!(levels.get(2).unwrap().join("\n"), level3);
        assert!(levels.get(3).is_none());
    }

    #[test]
    fn test_from_text_invalid_level() {
        let xsb_content = "; 1

####
# .#
#@@  #
####
";

        let result = Levels::from_text(xsb_content);
        assert!(matches!(result, Err(Error::MalformedMap(_))));
    }

    #[test]
    fn test_from_file_no_file() {
        let result = Levels::from_file(Path::new("nonexistent_file.xsb"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = LevelCatalog::builtin().unwrap();
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, ["tutorial", "easy", "medium", "hard"]);
        for name in names {
            assert_eq!(catalog.count(name).unwrap(), 4);
        }
        assert_eq!(
            catalog.get("tutorial", 0).unwrap(),
            ["#####", "#   #", "#$. #", "# @ #", "#####"]
        );
    }

    #[test]
    fn test_buckets_hold_every_level() {
        let catalog = LevelCatalog::builtin().unwrap();
        let mut total = 0;
        for (name, levels) in catalog.buckets() {
            assert_eq!(levels.len(), catalog.count(name).unwrap());
            for (index, level) in levels.iter().enumerate() {
                assert_eq!(level, catalog.get(name, index).unwrap());
                total += 1;
            }
        }
        assert_eq!(total, 16);
    }

    #[test]
    fn test_unknown_bucket() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert!(matches!(
            catalog.count("nightmare"),
            Err(Error::UnknownDifficulty(_))
        ));
        let err = catalog.get("easy", 4).unwrap_err();
        assert!(matches!(err, Error::LevelIndex { level: 5, total: 4, .. }));
        assert_eq!(err.to_string(), "Level 5 not found (easy has 4 levels)");
    }

    #[test]
    fn test_random_avoids_previous() {
        let catalog = LevelCatalog::builtin().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let (index, level) = catalog.random("easy", Some(2), &mut rng).unwrap();
            assert_ne!(index, 2);
            assert!(index < 4);
            assert_eq!(level, catalog.get("easy", index).unwrap());
        }
    }

    #[test]
    fn test_random_single_level_repeats() {
        let levels = Levels::from_text("#####\n#@$.#\n#####").unwrap();
        let catalog = LevelCatalog::new(vec![("one".to_string(), levels)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (index, _) = catalog.random("one", Some(0), &mut rng).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn test_random_is_reproducible_with_seed() {
        let catalog = LevelCatalog::builtin().unwrap();
        let picks = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..10)
                .map(|_| catalog.random("hard", None, &mut rng).unwrap().0)
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(42), picks(42));
    }
}
