/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::fs;
use std::io::{self,BufWriter,Write,ErrorKind};
use std::env;
use std::path::{Path,PathBuf};
use globset::GlobMatcher;
use tempfile::NamedTempFile;

use crate::io_error;

type Result<T> = std::result::Result<T,std::io::Error>;

/// check if dir pathname exists and is writable, try to create dir otherwise
pub fn ensure_writable_dir (path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    if path.is_dir() {
        let md = fs::metadata(&path)?;
        if md.permissions().readonly() {
            Err(io_error!(ErrorKind::PermissionDenied, "dir {:?} not writable", &path))
        } else {
            Ok(())
        }

    } else {
        fs::create_dir_all(path)
    }
}

/// return the regular files in `dir` whose filename matches the glob, sorted by path.
/// Fails if `dir` is not a readable directory
pub fn matching_files_in_dir<P: AsRef<Path>> (dir: &P, fname_glob: &GlobMatcher) -> Result<Vec<PathBuf>> {
    let dir: &Path = dir.as_ref();
    if !dir.is_dir() {
        return Err( io_error!(ErrorKind::NotFound, "not a directory: {:?}", dir))
    }

    let mut list: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            if let Some(fname) = entry.file_name().to_str() {
                if fname_glob.is_match( fname) {
                    list.push( path)
                }
            }
        }
    }

    list.sort();
    Ok(list)
}

/// write a file through a temporary sibling that is renamed into place once `write_fn` succeeded.
/// Readers of `path` therefore either see the previous or the complete new contents, never a partial file.
/// Note the temp file is deleted when dropped, i.e. on any error before the rename
pub fn write_file_atomic<P,F> (path: P, write_fn: F) -> Result<()>
    where P: AsRef<Path>, F: FnOnce(&mut dyn Write)->io::Result<()>
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new(".")
    };

    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = BufWriter::new(tmp);
    write_fn( &mut writer)?;
    writer.flush()?;

    let tmp = writer.into_inner().map_err(|e| e.into_error())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// move a file into the given directory, keeping its filename. An existing file of the same name in `dir`
/// is never replaced, the move fails with `ErrorKind::AlreadyExists` and leaves `path` in place.
/// The target is claimed by a hard link (which does not overwrite), falling back to an exclusive copy + remove
/// if source and target dir are on different devices. Returns the new path
pub fn move_file_to_dir (path: impl AsRef<Path>, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let fname = path.file_name().ok_or( io_error!(ErrorKind::InvalidInput, "not a valid filename {:?}", path))?;
    let target = dir.as_ref().join(fname);

    match fs::hard_link( path, &target) {
        Ok(()) => {}
        Err(e) if matches!( e.kind(), ErrorKind::CrossesDevices | ErrorKind::Unsupported) => copy_new_file( path, &target)?,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err( io_error!(ErrorKind::AlreadyExists, "target {:?} already exists", target))
        }
        Err(e) => return Err(e)
    }

    fs::remove_file( path)?;
    Ok(target)
}

/// copy into a file that must not exist yet. A partially written target is removed
fn copy_new_file (src: &Path, target: &Path) -> Result<()> {
    let mut reader = fs::File::open( src)?;
    let mut writer = fs::OpenOptions::new().write(true).create_new(true).open( target)?;

    if let Err(e) = io::copy( &mut reader, &mut writer).and_then(|_| writer.sync_all()) {
        let _ = fs::remove_file( target);
        return Err(e)
    }
    Ok(())
}

pub fn filepath_contents_as_string <P: AsRef<Path>> (path: &P) -> Result<String> {
    fs::read_to_string(path)
}

/// replace '~' and '$<name>' path elements
pub fn replace_env_var_path (path: impl AsRef<Path>)->Result<PathBuf> {
    let mut p = PathBuf::new();

    for (n,c) in path.as_ref().iter().enumerate() {
        let e = c.to_str().ok_or( io_error!(ErrorKind::InvalidInput, "invalid path: {:?}", path.as_ref()))?;

        if e == "~" && n == 0 {
            p.push( env::var("HOME").map_err( |_| io_error!(ErrorKind::NotFound, "HOME not set"))?)
        } else if e.len() > 1 && e.starts_with('$') {
            let name = &e[1..];
            p.push( env::var( name).map_err( |_| io_error!(ErrorKind::NotFound, "{e} not set"))?)
        } else {
            p.push(e)
        }
    }

    Ok(p)
}
