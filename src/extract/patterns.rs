// src/extract/patterns.rs
// =============================================================================
// The set of "key" files worth sending to the text generator.
//
// Patterns are exact repository-relative paths, never globs. Keeping the set
// small and literal bounds how many blobs one extraction can fetch no matter
// how large the repository is.
// =============================================================================

// Manifests, framework configs and common entry points, in priority order
pub const DEFAULT_KEY_FILES: &[&str] = &[
    // Manifests
    "package.json",
    "Cargo.toml",
    "pyproject.toml",
    "requirements.txt",
    "setup.py",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "composer.json",
    "Gemfile",
    // Framework and tooling config
    "tsconfig.json",
    "next.config.js",
    "next.config.mjs",
    "next.config.ts",
    "vite.config.ts",
    "vite.config.js",
    "nuxt.config.ts",
    "svelte.config.js",
    "tailwind.config.js",
    "tailwind.config.ts",
    "Dockerfile",
    "docker-compose.yml",
    "Makefile",
    // Entry points
    "src/index.ts",
    "src/index.js",
    "src/main.ts",
    "src/main.tsx",
    "src/App.tsx",
    "src/main.rs",
    "src/lib.rs",
    "app/page.tsx",
    "app/layout.tsx",
    "pages/index.tsx",
    "index.js",
    "main.py",
    "app.py",
    "main.go",
];

// An ordered set of exact key-file paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFilePatterns {
    paths: Vec<String>,
}

impl KeyFilePatterns {
    /// Builds a set from literal paths, dropping blanks and duplicates
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = KeyFilePatterns { paths: Vec::new() };
        set.extend(paths);
        set
    }

    /// Appends extra literal paths, keeping first-seen order
    pub fn extend<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            let path = path.into();
            let path = path.trim().trim_start_matches('/');
            if !path.is_empty() && !self.contains(path) {
                self.paths.push(path.to_string());
            }
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|pattern| pattern == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Default for KeyFilePatterns {
    fn default() -> Self {
        KeyFilePatterns::from_paths(DEFAULT_KEY_FILES.iter().copied())
    }
}
