// # Directory-style exporters
//
// Generic, Yealink, Cisco and Snom phones all read the same
// `IPPhoneDirectory` layout and only differ in the root element, an optional
// title and whether an entry may carry more than one number:
//
// ```xml
// <YealinkIPPhoneDirectory>
//     <DirectoryEntry>
//         <Name>Smith, Alice (AS1)</Name>
//         <Telephone>100</Telephone>
//         <Telephone>AS1@node1.local.mesh</Telephone>
//     </DirectoryEntry>
// </YealinkIPPhoneDirectory>
// ```
//
// Vendors limited to one `Telephone` get one sibling entry per dial target
// in combined mode instead.

use super::Contact;
use super::xml::XmlDocument;
use crate::error::Result;
use crate::traits::Exporter;

const ENTRY_TAG: &str = "DirectoryEntry";

/// Exporter for the `IPPhoneDirectory` family of schemas
#[derive(Debug, Clone, Copy)]
pub struct DirectoryExporter {
    vendor: &'static str,
    root: &'static str,
    title: Option<&'static str>,
    multiple_numbers: bool,
}

impl DirectoryExporter {
    pub fn generic() -> Self {
        Self {
            vendor: "generic",
            root: "IPPhoneDirectory",
            title: None,
            multiple_numbers: true,
        }
    }

    pub fn yealink() -> Self {
        Self {
            vendor: "yealink",
            root: "YealinkIPPhoneDirectory",
            title: None,
            multiple_numbers: true,
        }
    }

    pub fn cisco() -> Self {
        Self {
            vendor: "cisco",
            root: "CiscoIPPhoneDirectory",
            title: None,
            multiple_numbers: false,
        }
    }

    pub fn snom() -> Self {
        Self {
            vendor: "snom",
            root: "SnomIPPhoneDirectory",
            title: Some("Phonebook"),
            multiple_numbers: false,
        }
    }

    fn write_entry(&self, doc: &mut XmlDocument, name: &str, numbers: &[&str]) -> Result<()> {
        doc.open(ENTRY_TAG)?;
        doc.text_element("Name", name)?;
        for number in numbers {
            doc.text_element("Telephone", number)?;
        }
        doc.close(ENTRY_TAG)
    }
}

impl Exporter for DirectoryExporter {
    fn vendor(&self) -> &'static str {
        self.vendor
    }

    fn render(&self, contacts: &[Contact<'_>]) -> Result<Vec<u8>> {
        let mut doc = XmlDocument::new()?;
        doc.open(self.root)?;
        if let Some(title) = self.title {
            doc.text_element("Title", title)?;
        }

        for contact in contacts {
            let name = contact.display_name();
            let numbers = contact.dial.to_vec();
            if self.multiple_numbers {
                self.write_entry(&mut doc, &name, &numbers)?;
            } else {
                for number in numbers {
                    self.write_entry(&mut doc, &name, &[number])?;
                }
            }
        }

        doc.close(self.root)?;
        Ok(doc.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, Snapshot};
    use crate::exporter::{ExportOptions, Format, render};

    fn snapshot() -> Snapshot {
        Snapshot::new(vec![
            Entry::new("Alice", "Smith", "AS1", "100").with_address("AS1@node1.local.mesh"),
            Entry::new("Bob", "Jones", "BJ2", "101").with_address("BJ2@node2.local.mesh"),
        ])
    }

    fn render_str(exporter: DirectoryExporter, format: Format) -> String {
        let bytes = render(&exporter, &snapshot(), &ExportOptions::new(format)).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_generic_direct_layout() {
        let xml = render_str(DirectoryExporter::generic(), Format::Direct);
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<IPPhoneDirectory>
    <DirectoryEntry>
        <Name>Smith, Alice (AS1)</Name>
        <Telephone>AS1@node1.local.mesh</Telephone>
    </DirectoryEntry>
    <DirectoryEntry>
        <Name>Jones, Bob (BJ2)</Name>
        <Telephone>BJ2@node2.local.mesh</Telephone>
    </DirectoryEntry>
</IPPhoneDirectory>"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_yealink_combined_uses_two_numbers() {
        let xml = render_str(DirectoryExporter::yealink(), Format::Combined);
        assert!(xml.contains("<YealinkIPPhoneDirectory>"));
        assert_eq!(xml.matches("<DirectoryEntry>").count(), 2);
        assert_eq!(xml.matches("<Telephone>").count(), 4);

        let pbx = xml.find("<Telephone>100</Telephone>").unwrap();
        let direct = xml.find("<Telephone>AS1@node1.local.mesh</Telephone>").unwrap();
        assert!(pbx < direct);
    }

    #[test]
    fn test_cisco_combined_uses_sibling_entries() {
        let xml = render_str(DirectoryExporter::cisco(), Format::Combined);
        assert!(xml.contains("<CiscoIPPhoneDirectory>"));
        assert_eq!(xml.matches("<DirectoryEntry>").count(), 4);
        assert_eq!(xml.matches("<Name>Smith, Alice (AS1)</Name>").count(), 2);
    }

    #[test]
    fn test_snom_has_title() {
        let xml = render_str(DirectoryExporter::snom(), Format::Pbx);
        assert!(xml.contains("<SnomIPPhoneDirectory>\n    <Title>Phonebook</Title>"));
        assert!(xml.contains("<Telephone>101</Telephone>"));
    }

    #[test]
    fn test_empty_snapshot_renders_empty_directory() {
        let bytes = render(
            &DirectoryExporter::generic(),
            &Snapshot::empty(),
            &ExportOptions::new(Format::Pbx),
        )
        .unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("<IPPhoneDirectory>"));
        assert!(!xml.contains("DirectoryEntry"));
    }
}
