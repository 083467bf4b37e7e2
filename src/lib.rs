/*!
A PDF object model, byte-exact writer, and TrueType/OpenType font subsetter.

# Example

Building a two-object document body and writing it out in compact mode.

```
use pdf_core::{Dictionary, IndirectObject, Name, ObjectCollection, Variant, WriteMode, Writer};

let mut collection = ObjectCollection::new();
let page_ref = collection.reserve();
let parent_ref = collection.reserve();

let mut page = Dictionary::new();
page.add_or_replace("Type", Variant::name(Name::from_str("Page"))).unwrap();
page.add_or_replace("Parent", Variant::reference(parent_ref)).unwrap();
collection.insert(IndirectObject::new(page_ref, Variant::dictionary(page)));

let mut writer = Writer::new(WriteMode::Compact);
writer.write_header(1, 7);
writer.write_collection(&collection).unwrap();
let _bytes = writer.finish(page_ref);
```
*/

#![forbid(unsafe_code)]

mod array;
mod collection;
mod device;
mod dict;
mod encrypt;
mod error;
mod font;
mod indirect;
mod name;
mod primitive;
mod reference;
mod stream;
mod string;
mod variant;
mod writer;

pub use array::Array;
pub use collection::ObjectCollection;
pub use device::{CanvasInputDevice, Look, Read, Seek, SliceDevice, TryGetChar};
pub use dict::Dictionary;
pub use encrypt::PdfEncrypt;
pub use error::{PdfError, Result};
pub use font::{GidList, TrueTypeSubsetter};
pub use indirect::IndirectObject;
pub use name::Name;
pub use reference::Reference;
pub use stream::{PdfStream, Stream};
pub use string::PdfString;
pub use variant::{Kind, Variant};
pub use writer::{WriteMode, Writer};
