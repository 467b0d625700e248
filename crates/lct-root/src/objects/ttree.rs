//! TTree, TBranch and TLeaf streamers.
//!
//! The reader walks the `TTree` streamer far enough to collect the branch list,
//! then jumps to the end of the object. Everything after `fBranches` is ignored.

use std::collections::HashMap;

use crate::error::{Result, RootError};
use crate::rbuffer::{K_BYTE_COUNT_MASK, RBuffer};
use crate::tree::{BranchInfo, BranchLayout, LeafType, Tree};

const K_NEW_CLASS_TAG: u32 = 0xFFFF_FFFF;
const K_CLASS_MASK: u32 = 0x8000_0000;
const K_MAP_OFFSET: usize = 2;

/// Read a TTree from a decompressed key payload.
///
/// `key_len` is the length of the key header that preceded the payload; class
/// reference tags in the stream are measured from the key start.
pub fn read_ttree(payload: &[u8], key_len: usize) -> Result<Tree> {
    let mut r = RBuffer::with_origin(payload, key_len);
    let mut refs = ClassRefs::default();

    let (version, tree_end) = r.read_version()?;
    let tree_end =
        tree_end.ok_or_else(|| RootError::Deserialization("TTree missing byte count".into()))?;

    let (name, title) = r.read_tnamed()?;
    r.skip_versioned("TAttLine")?;
    r.skip_versioned("TAttFill")?;
    r.skip_versioned("TAttMarker")?;

    let entries = r.read_i64()?.max(0) as u64;
    // fTotBytes, fZipBytes, fSavedBytes
    r.skip(24)?;
    if version >= 18 {
        let _flushed_bytes = r.read_i64()?;
    }
    let _weight = r.read_f64()?;
    // fTimerInterval, fScanField, fUpdate
    r.skip(12)?;
    if version >= 18 {
        let _default_entry_offset_len = r.read_i32()?;
    }
    let n_cluster_range = if version >= 19 { r.read_i32()?.max(0) as usize } else { 0 };
    // fMaxEntries, fMaxEntryLoop, fMaxVirtualSize, fAutoSave
    r.skip(32)?;
    if version >= 18 {
        let _auto_flush = r.read_i64()?;
    }
    let _estimate = r.read_i64()?;

    if version >= 19 {
        // fClusterRangeEnd, fClusterSize
        for _ in 0..2 {
            if r.read_u8()? != 0 {
                r.skip(8 * n_cluster_range)?;
            }
        }
    }
    if version >= 20 {
        r.skip_versioned("TIOFeatures")?;
    }

    let mut branches = Vec::new();
    read_branch_array(&mut r, &mut refs, &mut branches)?;

    r.set_pos(tree_end);
    log::debug!("read TTree {name}: {entries} entries, {} branches", branches.len());
    Ok(Tree { name, title, entries, branches })
}

// ── Object references ──────────────────────────────────────────

/// One slot of a `TObjArray` or an object pointer member.
#[derive(Debug, PartialEq, Eq)]
enum Element {
    Null,
    /// Back-reference to an object streamed earlier.
    Reference(usize),
    /// Inline object; its streamer follows at the cursor.
    Object { class_name: String, end: Option<usize> },
}

/// Class names registered by `kNewClassTag`, keyed by map offset.
///
/// ROOT keeps one map per buffer, so a single instance must see the whole tree payload.
#[derive(Debug, Default)]
struct ClassRefs {
    classes: HashMap<usize, String>,
}

impl ClassRefs {
    fn read_element(&mut self, r: &mut RBuffer) -> Result<Element> {
        let start = r.pos();
        let first = r.read_u32()?;
        let (tag, tag_disp, end) =
            if first & K_BYTE_COUNT_MASK == 0 || first == K_NEW_CLASS_TAG {
                (first, r.displacement() - 4, None)
            } else {
                let count = (first & !K_BYTE_COUNT_MASK) as usize;
                let disp = r.displacement();
                (r.read_u32()?, disp, Some(start + 4 + count))
            };

        if tag & K_CLASS_MASK == 0 {
            return Ok(match tag {
                0 => Element::Null,
                t => Element::Reference(t as usize),
            });
        }

        let class_name = if tag == K_NEW_CLASS_TAG {
            let name = r.read_cstring()?;
            self.classes.insert(tag_disp + K_MAP_OFFSET, name.clone());
            name
        } else {
            let offset = (tag & !K_CLASS_MASK) as usize;
            self.classes.get(&offset).cloned().ok_or_else(|| {
                RootError::Deserialization(format!(
                    "class reference {offset} not registered (tag {tag:#010x})"
                ))
            })?
        };
        Ok(Element::Object { class_name, end })
    }
}

/// Read a `TObjArray` header and return its element count and end position.
fn read_objarray_header(r: &mut RBuffer, what: &str) -> Result<(usize, usize)> {
    let (_version, end) = r.read_version()?;
    let end = end
        .ok_or_else(|| RootError::Deserialization(format!("{what} TObjArray missing byte count")))?;
    r.read_tobject()?;
    let _name = r.read_string()?;
    let count = r.read_i32()?.max(0) as usize;
    let _low_bound = r.read_i32()?;
    Ok((count, end))
}

fn skip_object(r: &mut RBuffer, class_name: &str, end: Option<usize>) -> Result<()> {
    let end = end.ok_or_else(|| {
        RootError::Deserialization(format!("{class_name} streamed without byte count"))
    })?;
    r.set_pos(end);
    Ok(())
}

// ── Branches ───────────────────────────────────────────────────

/// Fields of a `TBranch` before it is resolved into a [`BranchInfo`].
#[derive(Debug)]
struct RawBranch {
    name: String,
    title: String,
    entries: u64,
    entry_offset_len: usize,
    basket_bytes: Vec<u32>,
    basket_entry: Vec<u64>,
    basket_seek: Vec<u64>,
    leaves: Vec<LeafMeta>,
}

fn read_branch_array(
    r: &mut RBuffer,
    refs: &mut ClassRefs,
    out: &mut Vec<BranchInfo>,
) -> Result<()> {
    let (count, end) = read_objarray_header(r, "fBranches")?;
    for _ in 0..count {
        let (class_name, obj_end) = match refs.read_element(r)? {
            Element::Null | Element::Reference(_) => continue,
            Element::Object { class_name, end } => (class_name, end),
        };
        let parsed = match class_name.as_str() {
            "TBranch" => read_tbranch(r, refs, out).map(|raw| resolve(raw, None)),
            "TBranchElement" => read_tbranch_element(r, refs, out),
            other => {
                log::debug!("skipping branch of class {other}");
                skip_object(r, other, obj_end)?;
                continue;
            }
        };
        match parsed {
            Ok(Some(info)) => insert_before_children(out, info),
            Ok(None) => {}
            Err(e) => {
                log::warn!("failed to read {class_name}: {e}");
                skip_object(r, &class_name, obj_end)?;
            }
        }
    }
    r.set_pos(end);
    Ok(())
}

/// Branches are listed parent first; children were pushed while the parent was read.
fn insert_before_children(out: &mut Vec<BranchInfo>, info: BranchInfo) {
    let prefix = format!("{}.", info.name);
    let at = out
        .iter()
        .position(|b| b.name.starts_with(&prefix))
        .unwrap_or(out.len());
    out.insert(at, info);
}

fn read_tbranch(
    r: &mut RBuffer,
    refs: &mut ClassRefs,
    children: &mut Vec<BranchInfo>,
) -> Result<RawBranch> {
    let (version, end) = r.read_version()?;
    let end =
        end.ok_or_else(|| RootError::Deserialization("TBranch missing byte count".into()))?;

    let (name, title) = r.read_tnamed()?;
    r.skip_versioned("TAttFill")?;

    let _compress = r.read_i32()?;
    let _basket_size = r.read_i32()?;
    let entry_offset_len = r.read_i32()?.max(0) as usize;
    let write_basket = r.read_i32()?.max(0) as usize;
    let _entry_number = r.read_i64()?;
    if version >= 13 {
        r.skip_versioned("TIOFeatures")?;
    }
    let _offset = r.read_i32()?;
    let max_baskets = r.read_i32()?.max(0) as usize;
    let _split_level = r.read_i32()?;
    let entries = r.read_i64()?.max(0) as u64;
    if version >= 11 {
        let _first_entry = r.read_i64()?;
    }
    // fTotBytes, fZipBytes
    r.skip(16)?;

    read_branch_array(r, refs, children)?;
    let leaves = read_leaf_array(r, refs)?;
    skip_basket_array(r, refs)?;

    let n = write_basket.min(max_baskets);
    let basket_bytes = read_basket_array(r, max_baskets, |r| Ok(r.read_i32()? as u32))?;
    let basket_entry = read_basket_array(r, max_baskets, |r| Ok(r.read_i64()?.max(0) as u64))?;
    let basket_seek = read_basket_array(r, max_baskets, |r| Ok(r.read_i64()?.max(0) as u64))?;

    r.set_pos(end);

    let mut basket_entry: Vec<u64> = basket_entry.into_iter().take(n + 1).collect();
    if basket_entry.len() == n {
        basket_entry.push(entries);
    }
    Ok(RawBranch {
        name,
        title,
        entries,
        entry_offset_len,
        basket_bytes: basket_bytes.into_iter().take(n).collect(),
        basket_entry,
        basket_seek: basket_seek.into_iter().take(n).collect(),
        leaves,
    })
}

/// `TBranchElement`: a `TBranch` base followed by class bookkeeping.
fn read_tbranch_element(
    r: &mut RBuffer,
    refs: &mut ClassRefs,
    children: &mut Vec<BranchInfo>,
) -> Result<Option<BranchInfo>> {
    let (_version, end) = r.read_version()?;
    let end = end
        .ok_or_else(|| RootError::Deserialization("TBranchElement missing byte count".into()))?;
    let raw = read_tbranch(r, refs, children)?;
    let class_name = r.read_string()?;
    r.set_pos(end);
    Ok(resolve(raw, Some(&class_name)))
}

/// Element baskets kept in memory at write time; the reader only uses baskets on disk.
fn skip_basket_array(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<()> {
    let (count, end) = read_objarray_header(r, "fBaskets")?;
    for _ in 0..count {
        if let Element::Object { class_name, end } = refs.read_element(r)? {
            log::debug!("ignoring in-memory {class_name}");
            skip_object(r, &class_name, end)?;
        }
    }
    r.set_pos(end);
    Ok(())
}

/// A `[fMaxBaskets]` array: one flag byte, then the values when the flag is set.
fn read_basket_array<T>(
    r: &mut RBuffer,
    max: usize,
    read: impl Fn(&mut RBuffer) -> Result<T>,
) -> Result<Vec<T>> {
    if r.read_u8()? == 0 {
        return Ok(Vec::new());
    }
    (0..max).map(|_| read(r)).collect()
}

/// Turn a streamed branch into reader metadata, or `None` if it holds no readable leaf.
fn resolve(raw: RawBranch, element_class: Option<&str>) -> Option<BranchInfo> {
    let leaf = raw.leaves.first()?;
    if raw.leaves.len() > 1 {
        log::debug!(
            "branch {} has {} leaves; reading {}",
            raw.name,
            raw.leaves.len(),
            leaf.name
        );
    }

    let vector_elem = element_class.and_then(vector_element_type);
    let (leaf_type, layout) = if let Some(t) = vector_elem {
        (t, BranchLayout::StlVector)
    } else {
        let t = match leaf.class_name.as_str() {
            "TLeafElement" => leaf.element_type.and_then(LeafType::from_data_type),
            c => LeafType::from_leaf_class(c, leaf.unsigned),
        };
        let Some(t) = t else {
            log::debug!("branch {} has unsupported leaf {}", raw.name, leaf.class_name);
            return None;
        };
        let layout = match (&leaf.counter, leaf.len) {
            (Some(counter), _) => BranchLayout::Counted { counter: counter.clone() },
            (None, n) if n > 1 => BranchLayout::FixedArray(n),
            _ => BranchLayout::Scalar,
        };
        (t, layout)
    };

    Some(BranchInfo {
        name: raw.name,
        title: raw.title,
        leaf_type,
        layout,
        entries: raw.entries,
        entry_offset_len: raw.entry_offset_len,
        basket_entry: raw.basket_entry,
        basket_seek: raw.basket_seek,
        basket_bytes: raw.basket_bytes,
    })
}

/// Element type of `vector<T>` / `std::vector<T>`.
fn vector_element_type(class_name: &str) -> Option<LeafType> {
    let inner = class_name
        .trim()
        .strip_prefix("std::")
        .unwrap_or(class_name.trim())
        .strip_prefix("vector<")?
        .strip_suffix('>')?;
    LeafType::from_cpp_name(inner)
}

// ── Leaves ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct LeafMeta {
    class_name: String,
    name: String,
    len: usize,
    unsigned: bool,
    counter: Option<String>,
    /// `fType` of a `TLeafElement`.
    element_type: Option<i32>,
}

fn read_leaf_array(r: &mut RBuffer, refs: &mut ClassRefs) -> Result<Vec<LeafMeta>> {
    let (count, end) = read_objarray_header(r, "fLeaves")?;
    let mut leaves = Vec::with_capacity(count);
    for _ in 0..count {
        if let Element::Object { class_name, end } = refs.read_element(r)? {
            leaves.push(read_leaf(r, refs, &class_name, end)?);
        }
    }
    r.set_pos(end);
    Ok(leaves)
}

fn read_leaf(
    r: &mut RBuffer,
    refs: &mut ClassRefs,
    class_name: &str,
    obj_end: Option<usize>,
) -> Result<LeafMeta> {
    if !class_name.starts_with("TLeaf") {
        return Err(RootError::UnsupportedClass(format!("{class_name} in fLeaves")));
    }
    let (_version, end) = r.read_version()?;

    // TLeaf base
    let (_base_version, base_end) = r.read_version()?;
    let (name, title) = r.read_tnamed()?;
    let len = r.read_i32()?.max(0) as usize;
    let _len_type = r.read_i32()?;
    let _offset = r.read_i32()?;
    let _is_range = r.read_bool()?;
    let unsigned = r.read_bool()?;
    let has_count = match refs.read_element(r)? {
        Element::Null => false,
        Element::Reference(_) => true,
        Element::Object { class_name, end } => {
            read_leaf(r, refs, &class_name, end)?;
            true
        }
    };
    if let Some(base_end) = base_end {
        r.set_pos(base_end);
    }

    let element_type = if class_name == "TLeafElement" {
        let _id = r.read_i32()?;
        Some(r.read_i32()?)
    } else {
        None
    };

    if let Some(end) = end.or(obj_end) {
        r.set_pos(end);
    }

    let counter = if has_count { counter_from_title(&title) } else { None };
    Ok(LeafMeta { class_name: class_name.to_string(), name, len, unsigned, counter, element_type })
}

/// Counter name from a leaf title such as `vtxxx[nvt]`; fixed dimensions are skipped.
fn counter_from_title(title: &str) -> Option<String> {
    let mut rest = title;
    while let Some(open) = rest.find('[') {
        let close = rest[open..].find(']')? + open;
        let dim = rest[open + 1..close].trim();
        if !dim.is_empty() && !dim.bytes().all(|b| b.is_ascii_digit()) {
            return Some(dim.to_string());
        }
        rest = &rest[close + 1..];
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versioned(version: u16, body: &[u8]) -> Vec<u8> {
        let mut out = (K_BYTE_COUNT_MASK | (body.len() as u32 + 2)).to_be_bytes().to_vec();
        out.extend_from_slice(&version.to_be_bytes());
        out.extend_from_slice(body);
        out
    }

    fn tobject() -> Vec<u8> {
        let mut out = 1u16.to_be_bytes().to_vec();
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&0x0300_0000u32.to_be_bytes());
        out
    }

    fn tstring(s: &str) -> Vec<u8> {
        let mut out = vec![s.len() as u8];
        out.extend_from_slice(s.as_bytes());
        out
    }

    fn tnamed(name: &str, title: &str) -> Vec<u8> {
        let mut body = tobject();
        body.extend(tstring(name));
        body.extend(tstring(title));
        versioned(1, &body)
    }

    /// A streamed `TLeafF` whose `fLeafCount` slot holds `leaf_count`.
    fn tleaff(name: &str, title: &str, len: i32, leaf_count: u32) -> Vec<u8> {
        let mut base = tnamed(name, title);
        base.extend_from_slice(&len.to_be_bytes());
        base.extend_from_slice(&4i32.to_be_bytes());
        base.extend_from_slice(&0i32.to_be_bytes());
        base.extend_from_slice(&[0, 0]);
        base.extend_from_slice(&leaf_count.to_be_bytes());
        let mut body = versioned(2, &base);
        body.extend_from_slice(&0f32.to_be_bytes());
        body.extend_from_slice(&0f32.to_be_bytes());
        versioned(1, &body)
    }

    fn element(class_tag: &[u8], object: &[u8]) -> Vec<u8> {
        let count = (class_tag.len() + object.len()) as u32;
        let mut out = (K_BYTE_COUNT_MASK | count).to_be_bytes().to_vec();
        out.extend_from_slice(class_tag);
        out.extend_from_slice(object);
        out
    }

    #[test]
    fn second_leaf_reuses_registered_class() {
        let origin = 64;
        let mut array_body = tobject();
        array_body.extend(tstring(""));
        array_body.extend_from_slice(&2i32.to_be_bytes());
        array_body.extend_from_slice(&0i32.to_be_bytes());

        // Header word + version precede the body.
        let first_tag_pos = 6 + array_body.len() + 4;
        let mut new_class = K_NEW_CLASS_TAG.to_be_bytes().to_vec();
        new_class.extend_from_slice(b"TLeafF\0");
        array_body.extend(element(&new_class, &tleaff("vtxxx", "vtxxx[nvt]", 1, 0x40)));

        let class_ref = K_CLASS_MASK | (first_tag_pos + origin + K_MAP_OFFSET) as u32;
        array_body.extend(element(&class_ref.to_be_bytes(), &tleaff("pos", "pos[3]", 3, 0)));
        let stream = versioned(3, &array_body);

        let mut r = RBuffer::with_origin(&stream, origin);
        let mut refs = ClassRefs::default();
        let leaves = read_leaf_array(&mut r, &mut refs).unwrap();
        assert_eq!(r.pos(), stream.len());
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].name, "vtxxx");
        assert_eq!(leaves[0].counter.as_deref(), Some("nvt"));
        assert_eq!(leaves[1].class_name, "TLeafF");
        assert_eq!(leaves[1].len, 3);
        assert_eq!(leaves[1].counter, None);
    }

    #[test]
    fn unknown_class_reference_is_an_error() {
        let mut stream = (K_BYTE_COUNT_MASK | 4).to_be_bytes().to_vec();
        stream.extend_from_slice(&(K_CLASS_MASK | 999).to_be_bytes());
        let mut r = RBuffer::new(&stream);
        assert!(ClassRefs::default().read_element(&mut r).is_err());
    }

    #[test]
    fn null_and_object_references() {
        let mut stream = 0u32.to_be_bytes().to_vec();
        stream.extend_from_slice(&0x52u32.to_be_bytes());
        let mut r = RBuffer::new(&stream);
        let mut refs = ClassRefs::default();
        assert_eq!(refs.read_element(&mut r).unwrap(), Element::Null);
        assert_eq!(refs.read_element(&mut r).unwrap(), Element::Reference(0x52));
    }

    #[test]
    fn counters_from_titles() {
        assert_eq!(counter_from_title("vtxxx[nvt]").as_deref(), Some("nvt"));
        assert_eq!(counter_from_title("m[3][nmc]").as_deref(), Some("nmc"));
        assert_eq!(counter_from_title("pos[3]"), None);
        assert_eq!(counter_from_title("evevt"), None);
    }

    #[test]
    fn vector_class_names() {
        assert_eq!(vector_element_type("vector<float>"), Some(LeafType::F32));
        assert_eq!(vector_element_type("std::vector<int>"), Some(LeafType::I32));
        assert_eq!(vector_element_type("vector<vector<float> >"), None);
        assert_eq!(vector_element_type("TLorentzVector"), None);
    }

    #[test]
    fn insert_parent_before_children() {
        let child = |name: &str| BranchInfo {
            name: name.into(),
            title: String::new(),
            leaf_type: LeafType::F64,
            layout: BranchLayout::Scalar,
            entries: 0,
            entry_offset_len: 0,
            basket_entry: vec![0],
            basket_seek: vec![],
            basket_bytes: vec![],
        };
        let mut out = vec![child("evevt"), child("mc.x"), child("mc.y")];
        insert_before_children(&mut out, child("mc"));
        let names: Vec<_> = out.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["evevt", "mc", "mc.x", "mc.y"]);
    }
}
