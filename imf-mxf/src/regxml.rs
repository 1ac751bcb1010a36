//! Essence descriptor projection to XML
//!
//! Each set is re-read from the resource as raw KLV bytes and decoded
//! through the primer and the registry. Properties are written in the order
//! the registry declares them, so identical bytes always give identical XML.
//! Properties the registry does not know follow in ascending label order,
//! and strong references are projected as nested elements in reference
//! order.

use crate::byte_range::ResourceByteRangeProvider;
use crate::error::{MxfError, Result};
use crate::header::HeaderPartition;
use crate::klv::fetch_unit_with;
use crate::metadata::{InterchangeObject, Property};
use crate::registry::{ItemDefinition, ItemType, Registry};
use crate::types::{
    decode_bool, decode_int, decode_timestamp, decode_uint, decode_ul, decode_ul_batch,
    decode_umid, decode_utf16, decode_uuid, decode_uuid_batch,
};
use imf_core::uuid_to_urn;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashSet;
use std::io::Cursor;
use uuid::Uuid;

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Projects essence descriptors of one header partition to XML fragments
pub struct DescriptorProjector<'a, P: ?Sized> {
    provider: &'a P,
    header: &'a HeaderPartition,
    registry: &'a Registry,
    strict: bool,
}

impl<'a, P> DescriptorProjector<'a, P>
where
    P: ResourceByteRangeProvider + ?Sized,
{
    /// Create a lenient projector
    pub fn new(provider: &'a P, header: &'a HeaderPartition, registry: &'a Registry) -> Self {
        DescriptorProjector {
            provider,
            header,
            registry,
            strict: false,
        }
    }

    /// Fail on unknown sets and properties instead of emitting placeholders
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Project one descriptor and its sub-descriptor closure
    pub fn project(&self, descriptor: &InterchangeObject) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        let mut visiting = HashSet::new();
        self.write_object(&mut writer, descriptor, true, &mut visiting)?;

        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| MxfError::Xml(e.to_string()))
    }

    /// Project every essence descriptor in file order
    pub fn project_all(&self) -> Result<Vec<String>> {
        self.header
            .essence_descriptors()
            .into_iter()
            .map(|d| self.project(d))
            .collect()
    }

    fn refetch(&self, object: &InterchangeObject) -> Result<InterchangeObject> {
        let klv = &object.header;
        let bytes = fetch_unit_with(self.provider, klv)?;
        let value = bytes
            .get(klv.key_length_size as usize..)
            .filter(|v| v.len() as u64 >= klv.value_size)
            .ok_or_else(|| {
                MxfError::klv(klv.byte_offset, "set runs past the end of the resource")
            })?;
        InterchangeObject::decode(klv, &value[..klv.value_size as usize], self.header.primer())
    }

    fn write_object(
        &self,
        writer: &mut XmlWriter,
        object: &InterchangeObject,
        root: bool,
        visiting: &mut HashSet<Uuid>,
    ) -> Result<()> {
        let object = self.refetch(object)?;
        let key = object.header.key;

        let group = match self.registry.group(&key) {
            Some(group) => group,
            None if self.strict => {
                return Err(MxfError::UnknownRegistryEntry {
                    ul: key.to_urn(),
                    offset: object.byte_offset(),
                })
            }
            None => {
                tracing::warn!(offset = object.byte_offset(), key = %key, "Set missing from registry");
                let mut element = BytesStart::new("UnknownGroup");
                if root {
                    element.push_attribute(("xmlns", self.registry.namespace.as_str()));
                }
                element.push_attribute(("ul", key.to_urn().as_str()));
                element.push_attribute(("instanceID", uuid_to_urn(&object.instance_uid).as_str()));
                writer.write_event(Event::Empty(element))?;
                return Ok(());
            }
        };

        if !visiting.insert(object.instance_uid) {
            return Err(MxfError::klv(
                object.byte_offset(),
                format!("reference cycle through {}", object.instance_uid),
            ));
        }

        let mut element = BytesStart::new(group.symbol.as_str());
        if root {
            element.push_attribute(("xmlns", self.registry.namespace.as_str()));
        }
        writer.write_event(Event::Start(element))?;

        let items = self.registry.items(group);
        let mut written = HashSet::new();
        for item in &items {
            if let Some((i, property)) = object
                .properties
                .iter()
                .enumerate()
                .find(|(_, p)| p.ul.map(|ul| ul.matches(item.ul.as_bytes())).unwrap_or(false))
            {
                if written.insert(i) {
                    self.write_item(writer, item, property, visiting)?;
                }
            }
        }

        let mut unknown: Vec<&Property> = object
            .properties
            .iter()
            .enumerate()
            .filter(|(i, _)| !written.contains(i))
            .map(|(_, p)| p)
            .collect();
        unknown.sort_by_key(|p| (p.ul.is_none(), p.ul.map(|ul| ul.normalized()), p.tag));
        for property in unknown {
            self.write_unknown(writer, property)?;
        }

        writer.write_event(Event::End(BytesEnd::new(group.symbol.as_str())))?;
        visiting.remove(&object.instance_uid);
        Ok(())
    }

    fn write_item(
        &self,
        writer: &mut XmlWriter,
        item: &ItemDefinition,
        property: &Property,
        visiting: &mut HashSet<Uuid>,
    ) -> Result<()> {
        let symbol = item.symbol.as_str();
        match item.item_type {
            ItemType::StrongRef | ItemType::StrongRefArray => {
                let targets = if item.item_type == ItemType::StrongRef {
                    vec![decode_uuid(&property.value, property.byte_offset)?]
                } else {
                    decode_uuid_batch(&property.value, property.byte_offset)?
                };
                writer.write_event(Event::Start(BytesStart::new(symbol)))?;
                for uid in targets {
                    let target = self.header.object(&uid).ok_or(MxfError::DanglingReference {
                        offset: property.byte_offset,
                        source_uid: Uuid::nil(),
                        target_uid: uid,
                    })?;
                    self.write_object(writer, target, false, visiting)?;
                }
                writer.write_event(Event::End(BytesEnd::new(symbol)))?;
            }
            ItemType::UlBatch => {
                let labels = decode_ul_batch(&property.value, property.byte_offset)?;
                writer.write_event(Event::Start(BytesStart::new(symbol)))?;
                for ul in labels {
                    write_text(writer, "UL", &ul.to_urn())?;
                }
                writer.write_event(Event::End(BytesEnd::new(symbol)))?;
            }
            item_type => match format_value(item_type, &property.value, property.byte_offset) {
                Ok(text) => write_text(writer, symbol, &text)?,
                Err(err) => {
                    tracing::warn!(
                        offset = property.byte_offset,
                        item = symbol,
                        error = %err,
                        "Property does not match its registry type"
                    );
                    write_text(writer, symbol, &hex(&property.value))?;
                }
            },
        }
        Ok(())
    }

    fn write_unknown(&self, writer: &mut XmlWriter, property: &Property) -> Result<()> {
        if self.strict {
            return Err(MxfError::UnknownRegistryEntry {
                ul: match property.ul {
                    Some(ul) => ul.to_urn(),
                    None => format!("local tag {:04x}", property.tag),
                },
                offset: property.byte_offset,
            });
        }

        let mut element = BytesStart::new("UnknownProperty");
        if let Some(ul) = property.ul {
            element.push_attribute(("ul", ul.to_urn().as_str()));
        }
        element.push_attribute(("tag", format!("{:04x}", property.tag).as_str()));
        writer.write_event(Event::Start(element))?;
        writer.write_event(Event::Text(BytesText::new(&hex(&property.value))))?;
        writer.write_event(Event::End(BytesEnd::new("UnknownProperty")))?;
        Ok(())
    }
}

fn write_text(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn format_value(item_type: ItemType, value: &[u8], offset: u64) -> Result<String> {
    let expect = |len: usize| -> Result<()> {
        if value.len() != len {
            return Err(MxfError::klv(
                offset,
                format!("{:?} value must be {} bytes, found {}", item_type, len, value.len()),
            ));
        }
        Ok(())
    };

    let text = match item_type {
        ItemType::UInt8 => {
            expect(1)?;
            decode_uint(value, offset)?.to_string()
        }
        ItemType::UInt16 => {
            expect(2)?;
            decode_uint(value, offset)?.to_string()
        }
        ItemType::UInt32 => {
            expect(4)?;
            decode_uint(value, offset)?.to_string()
        }
        ItemType::UInt64 => {
            expect(8)?;
            decode_uint(value, offset)?.to_string()
        }
        ItemType::Int32 => {
            expect(4)?;
            decode_int(value, offset)?.to_string()
        }
        ItemType::Int64 => {
            expect(8)?;
            decode_int(value, offset)?.to_string()
        }
        ItemType::Boolean => decode_bool(value, offset)?.to_string(),
        ItemType::Rational => {
            // written as stored, without reduction
            expect(8)?;
            let num = decode_int(&value[..4], offset)?;
            let den = decode_int(&value[4..], offset)?;
            format!("{}/{}", num, den)
        }
        ItemType::Uuid => uuid_to_urn(&decode_uuid(value, offset)?),
        ItemType::Ul => decode_ul(value, offset)?.to_urn(),
        ItemType::Umid => decode_umid(value, offset)?.to_urn(),
        ItemType::Utf16String => decode_utf16(value, offset)?,
        ItemType::Timestamp => decode_timestamp(value, offset)?.to_string(),
        ItemType::Version => {
            expect(2)?;
            format!("{}.{}", value[0], value[1])
        }
        ItemType::Bytes | ItemType::StrongRef | ItemType::StrongRefArray | ItemType::UlBatch => {
            hex(value)
        }
    };
    Ok(text)
}
