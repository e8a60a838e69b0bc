// # Grandstream exporter
//
// Grandstream phones use their own address book schema with split name
// fields and one `Phone` element per number:
//
// ```xml
// <AddressBook>
//     <Contact>
//         <LastName>*Smith</LastName>
//         <FirstName>Alice (AS1)</FirstName>
//         <Phone>
//             <phonenumber>100</phonenumber>
//             <accountindex>1</accountindex>
//         </Phone>
//     </Contact>
// </AddressBook>
// ```
//
// The active prefix goes in front of `LastName`, which is what the phone
// sorts and displays first.

use super::Contact;
use super::xml::XmlDocument;
use crate::error::Result;
use crate::traits::Exporter;

/// SIP account on the phone used to place calls
const ACCOUNT_INDEX: &str = "1";

#[derive(Debug, Clone, Copy, Default)]
pub struct GrandstreamExporter;

impl GrandstreamExporter {
    pub fn new() -> Self {
        Self
    }
}

fn first_name_field(contact: &Contact<'_>) -> String {
    let entry = contact.entry;
    match (entry.first_name.is_empty(), entry.callsign.is_empty()) {
        (_, true) => entry.first_name.clone(),
        (true, false) => entry.callsign.clone(),
        (false, false) => format!("{} ({})", entry.first_name, entry.callsign),
    }
}

impl Exporter for GrandstreamExporter {
    fn vendor(&self) -> &'static str {
        "grandstream"
    }

    fn render(&self, contacts: &[Contact<'_>]) -> Result<Vec<u8>> {
        let mut doc = XmlDocument::new()?;
        doc.open("AddressBook")?;

        for contact in contacts {
            doc.open("Contact")?;
            doc.text_element("LastName", &format!("{}{}", contact.prefix, contact.entry.last_name))?;
            doc.text_element("FirstName", &first_name_field(contact))?;
            for number in contact.dial.to_vec() {
                doc.open("Phone")?;
                doc.text_element("phonenumber", number)?;
                doc.text_element("accountindex", ACCOUNT_INDEX)?;
                doc.close("Phone")?;
            }
            doc.close("Contact")?;
        }

        doc.close("AddressBook")?;
        Ok(doc.finish())
    }
}
