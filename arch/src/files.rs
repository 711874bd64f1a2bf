use std::{
    io,
    path::{Path, PathBuf},
};

/// Input files of a tool run. A directory yields its `*.ext` files sorted by
/// name, anything else is taken as the only input.
pub fn sources(input: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(input)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
