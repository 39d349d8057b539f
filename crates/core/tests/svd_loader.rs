use std::path::Path;

use regmap_core::svd::{load_peripheral_map, parse_number, parse_peripheral_map, SvdError};

const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<device>
  <name>STM32F407</name>
  <peripherals>
    <peripheral>
      <name>FLASH</name>
      <description>FLASH memory interface</description>
      <baseAddress>0x40023C00</baseAddress>
      <registers>
        <register>
          <name>ACR</name>
          <description>Access control register</description>
          <addressOffset>0x0</addressOffset>
          <resetValue>0x20</resetValue>
          <fields>
            <field>
              <name>LATENCY</name>
              <description>Wait states</description>
              <bitOffset>0</bitOffset>
              <bitWidth>3</bitWidth>
            </field>
          </fields>
        </register>
      </registers>
    </peripheral>
    <peripheral derivedFrom="FLASH">
      <name>FLASH_ALT</name>
      <baseAddress>0x40023D00</baseAddress>
    </peripheral>
  </peripherals>
</device>
"#;

#[test]
fn loads_peripherals_in_document_order() {
    let map = parse_peripheral_map(DOC).expect("parse");
    assert_eq!(map.len(), 2);
    let names: Vec<&str> = map.names().collect();
    assert_eq!(names, vec!["FLASH", "FLASH_ALT"]);
}

#[test]
fn loads_peripheral_attributes_and_children() {
    let map = parse_peripheral_map(DOC).expect("parse");

    let flash = map.get("FLASH").expect("FLASH present");
    assert_eq!(flash.description.as_deref(), Some("FLASH memory interface"));
    assert_eq!(flash.base_address, Some(0x4002_3C00));
    assert_eq!(flash.derived_from, None);
    assert_eq!(flash.registers.len(), 1);

    let acr = &flash.registers[0];
    assert_eq!(acr.name, "ACR");
    assert_eq!(acr.address_offset, 0x0);
    assert_eq!(acr.reset_value, Some(0x20));
    assert_eq!(acr.fields.len(), 1);

    let latency = &acr.fields[0];
    assert_eq!(latency.name, "LATENCY");
    assert_eq!(latency.bit_offset, 0);
    assert_eq!(latency.bit_width, 3);
}

#[test]
fn loads_derived_from_attribute() {
    let map = parse_peripheral_map(DOC).expect("parse");
    let alt = map.get("FLASH_ALT").expect("FLASH_ALT present");
    assert_eq!(alt.derived_from.as_deref(), Some("FLASH"));
    assert_eq!(alt.base_address, Some(0x4002_3D00));
    assert!(alt.registers.is_empty());
}

#[test]
fn loads_clusters_including_nested_ones() {
    let doc = r#"
    <peripherals>
      <peripheral>
        <name>DMA</name>
        <baseAddress>0x40026000</baseAddress>
        <registers>
          <register><name>CR</name><addressOffset>0x0</addressOffset></register>
          <cluster>
            <name>CH1</name>
            <addressOffset>0x10</addressOffset>
            <register><name>CCR</name><addressOffset>0x0</addressOffset></register>
            <cluster>
              <name>SUB</name>
              <addressOffset>0x20</addressOffset>
              <register><name>SR</name><addressOffset>0x4</addressOffset></register>
            </cluster>
          </cluster>
        </registers>
      </peripheral>
    </peripherals>
    "#;
    let map = parse_peripheral_map(doc).expect("parse");
    let dma = map.get("DMA").expect("DMA present");

    assert_eq!(dma.registers.len(), 1);
    assert_eq!(dma.clusters.len(), 1);

    let ch1 = &dma.clusters[0];
    assert_eq!(ch1.name, "CH1");
    assert_eq!(ch1.address_offset, 0x10);
    assert_eq!(ch1.registers.len(), 1);
    assert_eq!(ch1.clusters.len(), 1);

    let sub = &ch1.clusters[0];
    assert_eq!(sub.name, "SUB");
    assert_eq!(sub.address_offset, 0x20);
    assert_eq!(sub.registers[0].name, "SR");
}

#[test]
fn missing_peripherals_collection_is_malformed() {
    let err = parse_peripheral_map("<device><name>X</name></device>").unwrap_err();
    assert!(matches!(err, SvdError::Malformed(_)), "got {err:?}");
}

#[test]
fn ill_formed_xml_is_malformed() {
    let err = parse_peripheral_map("<device><peripherals></device>").unwrap_err();
    assert!(matches!(err, SvdError::Malformed(_)), "got {err:?}");
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_peripheral_map(Path::new("/nonexistent/chip.svd")).unwrap_err();
    assert!(matches!(err, SvdError::Io(_)), "got {err:?}");
}

#[test]
fn nameless_peripherals_are_skipped_not_fatal() {
    let doc = r#"
    <peripherals>
      <peripheral><baseAddress>0x40000000</baseAddress></peripheral>
      <peripheral><name>TIM1</name></peripheral>
    </peripherals>
    "#;
    let map = parse_peripheral_map(doc).expect("parse");
    assert_eq!(map.len(), 1);
    assert!(map.get("TIM1").is_some());
}

#[test]
fn parse_number_handles_hex_and_decimal() {
    assert_eq!(parse_number("0x40023C00"), Some(0x4002_3C00));
    assert_eq!(parse_number("0X20"), Some(0x20));
    assert_eq!(parse_number("  12  "), Some(12));
    assert_eq!(parse_number("0x"), None);
    assert_eq!(parse_number("banana"), None);
}
