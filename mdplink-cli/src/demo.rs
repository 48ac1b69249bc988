//! The simulated target the CLI runs against.

use mdplink::{DeviceSim, MdpValue, ModuleType};

/// Builds a target with a representative device-manager module set.
pub fn demo_device() -> DeviceSim {
    let sim = DeviceSim::new();

    sim.add_module(1, ModuleType::Cpu);
    sim.add_module(2, ModuleType::Nic);
    sim.add_module(3, ModuleType::Time);
    sim.add_module(4, ModuleType::Memory);
    sim.add_module(5, ModuleType::TwinCat);
    sim.add_module(6, ModuleType::Firewall);
    sim.add_module(7, ModuleType::Misc);
    sim.add_module(8, ModuleType::DiskManagement);
    sim.add_module(9, ModuleType::Mainboard);
    sim.add_module(10, ModuleType::Software);
    sim.add_module(11, ModuleType::OperatingSystem);

    // CPU frequency in MHz and a usage gauge that moves between reads.
    sim.set_parameter_read_only(1, 1, 1, &MdpValue::U32(2496));
    sim.set_parameter_sequence(
        1,
        1,
        2,
        &[
            MdpValue::U16(12),
            MdpValue::U16(12),
            MdpValue::U16(47),
            MdpValue::U16(47),
            MdpValue::U16(23),
        ],
    );

    // NIC name and DHCP flag.
    sim.set_parameter_read_only(2, 0, 3, &MdpValue::from("em0"));
    sim.set_parameter(2, 1, 4, &MdpValue::Bool(true));

    // SNTP server and refresh interval in seconds.
    sim.set_parameter(3, 1, 1, &MdpValue::from("111.111.111.111"));
    sim.set_parameter(3, 1, 2, &MdpValue::U32(32));

    sim
}
