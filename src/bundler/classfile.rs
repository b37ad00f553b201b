// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Minimal JVM class file reader.
//!
//! Only the constant pool, the class header and member descriptors are read. That
//! is enough to find every package a class refers to: class constants, field and
//! method descriptors from `NameAndType` and `MethodType` entries, and the
//! descriptors of the class's own fields and methods.

use std::collections::BTreeSet;
use thiserror::Error;

const MAGIC: u32 = 0xCAFE_BABE;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELD_REF: u8 = 9;
const TAG_METHOD_REF: u8 = 10;
const TAG_INTERFACE_METHOD_REF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassFileError {
    #[error("not a class file (magic 0x{0:08X})")]
    BadMagic(u32),

    #[error("class file is truncated")]
    Truncated,

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("constant pool index {0} does not point at the expected entry")]
    BadIndex(u16),
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class(u16),
    NameAndType { descriptor: u16 },
    MethodType(u16),
    Other,
    /// Second slot of a long or double.
    Unusable,
}

/// What a single class file tells us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    /// Internal name, e.g. `org/example/Lib`.
    pub name: String,
    /// Dotted package names referenced anywhere in the class, its own included.
    pub referenced_packages: BTreeSet<String>,
}

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], ClassFileError> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClassFileError::Truncated)?;
        let slice = &self.bytes[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn u1(&mut self) -> Result<u8, ClassFileError> {
        Ok(self.take(1)?[0])
    }

    fn u2(&mut self) -> Result<u16, ClassFileError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u4(&mut self) -> Result<u32, ClassFileError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassFileError> {
        self.take(len).map(|_| ())
    }
}

pub fn parse(bytes: &[u8]) -> Result<ClassInfo, ClassFileError> {
    let mut reader = Reader { bytes, position: 0 };

    let magic = reader.u4()?;
    if magic != MAGIC {
        return Err(ClassFileError::BadMagic(magic));
    }
    reader.skip(4)?;

    let pool = read_constant_pool(&mut reader)?;
    let mut packages = BTreeSet::new();

    for constant in &pool {
        match constant {
            Constant::Class(name_index) => {
                let name = utf8(&pool, *name_index)?;
                if name.starts_with('[') {
                    packages_in_descriptor(name, &mut packages);
                } else {
                    insert_package(name, &mut packages);
                }
            }
            Constant::NameAndType { descriptor } | Constant::MethodType(descriptor) => {
                packages_in_descriptor(utf8(&pool, *descriptor)?, &mut packages);
            }
            _ => {}
        }
    }

    reader.skip(2)?;
    let this_class = reader.u2()?;
    let name = match pool.get(usize::from(this_class)) {
        Some(Constant::Class(name_index)) => utf8(&pool, *name_index)?.to_string(),
        _ => return Err(ClassFileError::BadIndex(this_class)),
    };
    reader.skip(2)?;
    let interfaces = reader.u2()?;
    reader.skip(usize::from(interfaces) * 2)?;

    // fields, then methods
    for _ in 0..2 {
        let count = reader.u2()?;
        for _ in 0..count {
            reader.skip(4)?;
            let descriptor = reader.u2()?;
            packages_in_descriptor(utf8(&pool, descriptor)?, &mut packages);
            skip_attributes(&mut reader)?;
        }
    }

    Ok(ClassInfo {
        name,
        referenced_packages: packages,
    })
}

fn read_constant_pool(reader: &mut Reader<'_>) -> Result<Vec<Constant>, ClassFileError> {
    let count = usize::from(reader.u2()?);
    let mut pool = Vec::with_capacity(count);
    pool.push(Constant::Unusable);

    let mut index = 1usize;
    while index < count {
        let tag = reader.u1()?;
        let constant = match tag {
            TAG_UTF8 => {
                let len = reader.u2()?;
                let raw = reader.take(usize::from(len))?;
                Constant::Utf8(String::from_utf8_lossy(raw).into_owned())
            }
            TAG_CLASS => Constant::Class(reader.u2()?),
            TAG_NAME_AND_TYPE => {
                reader.skip(2)?;
                Constant::NameAndType {
                    descriptor: reader.u2()?,
                }
            }
            TAG_METHOD_TYPE => Constant::MethodType(reader.u2()?),
            TAG_STRING | TAG_MODULE | TAG_PACKAGE => {
                reader.skip(2)?;
                Constant::Other
            }
            TAG_METHOD_HANDLE => {
                reader.skip(3)?;
                Constant::Other
            }
            TAG_INTEGER
            | TAG_FLOAT
            | TAG_FIELD_REF
            | TAG_METHOD_REF
            | TAG_INTERFACE_METHOD_REF
            | TAG_DYNAMIC
            | TAG_INVOKE_DYNAMIC => {
                reader.skip(4)?;
                Constant::Other
            }
            TAG_LONG | TAG_DOUBLE => {
                // Takes two slots; the second must still be inside the pool.
                if index + 2 > count {
                    return Err(ClassFileError::Truncated);
                }
                reader.skip(8)?;
                pool.push(Constant::Other);
                index += 1;
                Constant::Unusable
            }
            _ => {
                return Err(ClassFileError::UnknownTag {
                    tag,
                    index: index as u16,
                });
            }
        };
        pool.push(constant);
        index += 1;
    }

    Ok(pool)
}

fn skip_attributes(reader: &mut Reader<'_>) -> Result<(), ClassFileError> {
    let count = reader.u2()?;
    for _ in 0..count {
        reader.skip(2)?;
        let len = reader.u4()?;
        reader.skip(len as usize)?;
    }
    Ok(())
}

fn utf8(pool: &[Constant], index: u16) -> Result<&str, ClassFileError> {
    match pool.get(usize::from(index)) {
        Some(Constant::Utf8(value)) => Ok(value),
        _ => Err(ClassFileError::BadIndex(index)),
    }
}

/// Collects every `Lpkg/Name;` type from a field or method descriptor.
fn packages_in_descriptor(descriptor: &str, packages: &mut BTreeSet<String>) {
    let mut rest = descriptor;
    while let Some(start) = rest.find('L') {
        let after = &rest[start + 1..];
        let Some(end) = after.find(';') else {
            return;
        };
        insert_package(&after[..end], packages);
        rest = &after[end + 1..];
    }
}

fn insert_package(internal_name: &str, packages: &mut BTreeSet<String>) {
    if let Some(package) = package_of(internal_name) {
        packages.insert(package);
    }
}

/// `org/example/Lib` to `org.example`; `None` for the default package.
pub fn package_of(internal_name: &str) -> Option<String> {
    internal_name
        .rsplit_once('/')
        .map(|(package, _)| package.replace('/', "."))
}
