#![no_main]

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use threesg::{Binding, Generator, Loader};

#[derive(Debug, Arbitrary)]
struct Project<'a> {
    page: &'a str,
    page_config: Option<&'a str>,
    files: Vec<(&'a str, &'a str)>,
    globals: Vec<(&'a str, &'a str)>,
}

struct Memory(BTreeMap<PathBuf, String>);

impl Loader for Memory {
    fn load(&self, path: &Path) -> io::Result<String> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| io::ErrorKind::NotFound.into())
    }

    fn exists(&self, path: &Path) -> bool {
        self.0.contains_key(path)
    }
}

fuzz_target!(|project: Project<'_>| {
    let mut files = BTreeMap::new();
    for (path, contents) in project.files {
        files.insert(PathBuf::from(path), contents.to_owned());
    }
    files.insert(PathBuf::from("web/index.html"), project.page.to_owned());
    if let Some(cfg) = project.page_config {
        files.insert(PathBuf::from("web/index.html.cfg"), cfg.to_owned());
    }
    let globals: Vec<_> = project
        .globals
        .into_iter()
        .map(|(k, v)| Binding::new(k, v))
        .collect();

    let generator = Generator::with_loader("", Memory(files));
    let _ = generator
        .page(Path::new("web"), "/index.html")
        .with_globals(&globals)
        .with_max_depth(16)
        .to_string();
});
