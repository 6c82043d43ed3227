//! Board tests against the simulated platform
//!
//! These tests verify the hardware state each board controller leaves
//! behind:
//! - Reset baselines for direct and CARP wiring
//! - Filter, PA and attenuator selection on the right lines
//! - The Argon synthesizer sequence on the I2C bridge
//! - Configuration mistakes reported without touching hardware
//! - Several boards sharing one CARP carrier

use std::sync::Arc;

use pc_card::filters::{RX_HIGH_PASS, RX_LOW_PASS, TX_FILTERS};
use pc_card::synth::{FCAL_ENABLE, POWER_DOWN, RESET};
use pc_card::{
    Argon, ArgonConfig, Bismuth, BismuthConfig, BoardError, Card, CardConfig, Cardf, CardfConfig,
    RecordingDiagnostics, Selenium, SeleniumConfig, SynthState, Tellurium, TelluriumConfig,
};
use pc_gpio::gpo::GPO_DATA_REGISTER;
use pc_gpio::mux::MUX_RESET;
use pc_gpio::platform::{BASE_GPIO_CHIP, CARP_GPIO_CHIP, TRANSCEIVER_DEVICE};
use pc_sim::{SimPlatform, Transaction};
use proptest::prelude::*;

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    pub const CARD_CHIP: u32 = 3;
    pub const I2C_BUS: u32 = 1;
    pub const BRIDGE: u8 = 0x2B;

    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }

    pub fn setup() -> (SimPlatform, Arc<RecordingDiagnostics>) {
        init_tracing();
        (SimPlatform::new(), RecordingDiagnostics::new())
    }

    /// Levels of consecutive lines, `None` where a line was never driven
    pub fn levels(platform: &SimPlatform, chip: u32, offsets: &[u32]) -> Vec<Option<u8>> {
        offsets
            .iter()
            .map(|&offset| platform.line_level(chip, offset))
            .collect()
    }

    pub fn driven(levels: &[u8]) -> Vec<Option<u8>> {
        levels.iter().copied().map(Some).collect()
    }

    pub fn lines_set(chip: u32, offsets: &[u32], values: &[u8]) -> Transaction {
        Transaction::LinesSet {
            chip,
            offsets: offsets.to_vec(),
            values: values.to_vec(),
        }
    }

    pub fn spi(data: &[u8]) -> (u8, u8, Vec<u8>) {
        (BRIDGE, 0x01, data.to_vec())
    }

    pub fn gpo_data(platform: &SimPlatform) -> u8 {
        platform.register(TRANSCEIVER_DEVICE, GPO_DATA_REGISTER)
    }

    pub fn mux_resets(platform: &SimPlatform) -> usize {
        platform
            .journal()
            .iter()
            .filter(|t| **t == lines_set(BASE_GPIO_CHIP, &[MUX_RESET], &[0]))
            .count()
    }

    pub fn warning_messages(diag: &RecordingDiagnostics) -> Vec<String> {
        diag.warnings().into_iter().map(|r| r.message).collect()
    }

    pub fn argon_config() -> ArgonConfig {
        ArgonConfig::new(0, CARD_CHIP, 0, I2C_BUS, BRIDGE)
    }

    pub fn carp_argon_config(slot: u8) -> ArgonConfig {
        ArgonConfig {
            carp: true,
            ..ArgonConfig::new(slot, CARD_CHIP, 0, I2C_BUS, BRIDGE)
        }
    }

    pub fn bismuth_config(slot: u8) -> BismuthConfig {
        BismuthConfig {
            reset: true,
            ..BismuthConfig::new(slot, CARD_CHIP, 0)
        }
    }
}

use helpers::*;

// ============================================================================
// Argon
// ============================================================================

mod argon_tests {
    use super::*;

    #[test]
    fn open_configures_bridge_and_powers_down() {
        let (platform, diag) = setup();
        let argon = Argon::open(&platform, &argon_config(), diag).unwrap();

        assert_eq!(argon.name(), "argon_0");
        assert_eq!(argon.synth_state(), SynthState::Down);
        assert_eq!(
            platform.bus_writes(I2C_BUS),
            vec![(BRIDGE, 0x00, vec![0x00]), spi(&RESET), spi(&POWER_DOWN)]
        );
        // Synth enable and both mixers off
        assert_eq!(levels(&platform, CARD_CHIP, &[0, 1, 2]), driven(&[0, 0, 0]));
        // TX unfiltered, receiving
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[95, 96, 97]), driven(&[0, 0, 1]));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 125), Some(1));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 126), Some(0));
        assert_eq!(gpo_data(&platform) & 0x40, 0);
    }

    #[test]
    fn below_synth_range_passes_through() {
        let (platform, diag) = setup();
        let mut argon = Argon::open(&platform, &argon_config(), diag.clone()).unwrap();

        let tuned = argon.configure_synth(5_000_000_000, true).unwrap();

        assert_eq!(tuned, 5_000_000_000);
        assert_eq!(argon.synth_state(), SynthState::Down);
        assert_eq!(platform.line_level(CARD_CHIP, 0), Some(0));
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn lowest_band_locks_and_offsets() {
        let (platform, diag) = setup();
        let mut argon = Argon::open(&platform, &argon_config(), diag).unwrap();
        platform.drain_journal();

        let tuned = argon.configure_synth(7_000_000_000, true).unwrap();

        assert_eq!(tuned, 1_070_000_000);
        assert_eq!(argon.synth_state(), SynthState::Locked(0));

        let writes = platform.bus_writes(I2C_BUS);
        assert_eq!(writes.len(), 84);
        assert_eq!(writes.last(), Some(&spi(&FCAL_ENABLE)));
        assert!(platform.journal().contains(&Transaction::Delay { ms: 10 }));

        // Enable and both mixers on
        assert_eq!(levels(&platform, CARD_CHIP, &[0, 1, 2]), driven(&[1, 1, 1]));
        // 1.07 GHz on the transceiver side selects the 1.3 GHz filter
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[95, 96, 97]), driven(&[1, 1, 0]));
    }

    #[test]
    fn calibration_waits_before_fcal() {
        let (platform, diag) = setup();
        let mut argon = Argon::open(&platform, &argon_config(), diag).unwrap();
        platform.drain_journal();

        argon.configure_synth(13_000_000_000, false).unwrap();

        let journal = platform.journal();
        let delay = journal
            .iter()
            .position(|t| *t == Transaction::Delay { ms: 10 })
            .unwrap();
        let fcal = Transaction::BusWrite {
            bus: I2C_BUS,
            address: BRIDGE,
            register: 0x01,
            data: FCAL_ENABLE.to_vec(),
        };
        assert_eq!(journal.get(delay + 1), Some(&fcal));
    }

    #[test]
    fn upper_band_writes_overrides() {
        let (platform, diag) = setup();
        let mut argon = Argon::open(&platform, &argon_config(), diag).unwrap();

        let tuned = argon.configure_synth(20_000_000_000, false).unwrap();

        assert_eq!(tuned, 5_000_000_000);
        assert_eq!(argon.synth_state(), SynthState::Locked(2));
        let writes = platform.bus_writes(I2C_BUS);
        assert!(writes.contains(&spi(&[0x24, 0x00, 0x4B])));
        assert!(writes.contains(&spi(&[0x2B, 0x00, 0x00])));
    }

    #[test]
    fn beyond_synth_range_warns_and_stays_down() {
        let (platform, diag) = setup();
        let mut argon = Argon::open(&platform, &argon_config(), diag.clone()).unwrap();

        let tuned = argon.configure_synth(25_000_000_000, true).unwrap();

        assert_eq!(tuned, 25_000_000_000);
        assert_eq!(argon.synth_state(), SynthState::Down);
        assert_eq!(platform.line_level(CARD_CHIP, 0), Some(0));
        assert_eq!(platform.bus_writes(I2C_BUS).last(), Some(&spi(&POWER_DOWN)));
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[95, 96, 97]), driven(&[0, 0, 1]));

        let warnings = warning_messages(&diag);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Could not tune to frequency 25000000000"));
    }

    #[test]
    fn reset_after_lock_powers_down() {
        let (platform, diag) = setup();
        let mut argon = Argon::open(&platform, &argon_config(), diag).unwrap();
        argon.configure_synth(7_000_000_000, true).unwrap();

        argon.reset().unwrap();

        assert_eq!(argon.synth_state(), SynthState::Down);
        assert_eq!(levels(&platform, CARD_CHIP, &[0, 1, 2]), driven(&[0, 0, 0]));
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[95, 96, 97]), driven(&[0, 0, 1]));
    }

    #[test]
    fn transmit_and_receive_direct() {
        let (platform, diag) = setup();
        let mut argon = Argon::open(&platform, &argon_config(), diag).unwrap();

        argon.configure_transmit().unwrap();
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 125), Some(0));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 126), Some(1));
        assert_eq!(gpo_data(&platform) & 0x40, 0x40);

        argon.configure_receive().unwrap();
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 125), Some(1));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 126), Some(0));
        assert_eq!(gpo_data(&platform) & 0x40, 0);
    }

    #[test]
    fn carp_slot_routes_tx_enable_through_mux() {
        let (platform, diag) = setup();
        let mut argon = Argon::open(&platform, &carp_argon_config(1), diag).unwrap();

        // RFP_1_ADGPO_2 is mux input 4
        assert_eq!(platform.mux_route(4), Some(0));
        assert_eq!(levels(&platform, CARP_GPIO_CHIP, &[7, 8, 9]), driven(&[0, 0, 1]));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 132), Some(1));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 133), Some(0));

        argon.configure_transmit().unwrap();
        assert_eq!(platform.mux_route(4), Some(1));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 133), Some(1));
    }

    #[test]
    fn carp_slot_without_tx_enable_is_rejected() {
        let (platform, diag) = setup();

        let result = Argon::open(&platform, &carp_argon_config(4), diag);

        assert!(matches!(
            result,
            Err(BoardError::UnsupportedSlot { board: "argon", slot: 4 })
        ));
    }

    #[test]
    fn offline_bridge_fails_open() {
        let (platform, diag) = setup();
        platform.set_offline("i2c-1", true);

        let result = Argon::open(&platform, &argon_config(), diag);

        assert!(matches!(result, Err(BoardError::Line(_))));
    }

    #[test]
    fn bus_failure_mid_band_leaves_tuning() {
        let (platform, diag) = setup();
        let mut argon = Argon::open(&platform, &argon_config(), diag).unwrap();
        // Reset and power-up take four writes, the rest fail partway through the band
        platform.fail_after("i2c-1", 14);

        let result = argon.configure_synth(7_000_000_000, false);

        assert!(matches!(result, Err(BoardError::Line(_))));
        assert_eq!(argon.synth_state(), SynthState::Tuning(0));

        // Not locked, so filters follow the RF frequency unchanged
        argon.configure_tx_filters(1_000_000_000).unwrap();
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[95, 96, 97]), driven(&[1, 1, 0]));

        platform.clear_failures();
        assert_eq!(argon.configure_synth(7_000_000_000, false).unwrap(), 1_070_000_000);
        assert_eq!(argon.synth_state(), SynthState::Locked(0));
    }

    #[test]
    fn send_spi_passes_bytes_through() {
        let (platform, diag) = setup();
        let config = ArgonConfig {
            reset: false,
            ..argon_config()
        };
        let mut argon = Argon::open(&platform, &config, diag).unwrap();

        argon.send_spi(&[0x00, 0x27, 0x14]).unwrap();

        assert_eq!(
            platform.bus_writes(I2C_BUS),
            vec![(BRIDGE, 0x00, vec![0x00]), spi(&[0x00, 0x27, 0x14])]
        );
    }
}

// ============================================================================
// Bismuth
// ============================================================================

mod bismuth_tests {
    use super::*;

    #[test]
    fn carp_slots_without_lna_enables_are_rejected() {
        for slot in [0, 3] {
            let (platform, diag) = setup();
            let result = Bismuth::open(&platform, &bismuth_config(slot), diag);
            assert!(
                matches!(
                    result,
                    Err(BoardError::UnsupportedSlot { board: "bismuth", slot: s }) if s == slot
                ),
                "slot {}",
                slot
            );
        }
    }

    #[test]
    fn reset_baseline_on_carp() {
        let (platform, diag) = setup();
        let bismuth = Bismuth::open(&platform, &bismuth_config(1), diag).unwrap();

        assert_eq!(bismuth.name(), "bismuth_1");
        // PA on expander 7, 8; TX filters on 9, 10, 11
        assert_eq!(
            levels(&platform, CARP_GPIO_CHIP, &[7, 8, 9, 10, 11]),
            driven(&[0, 0, 0, 0, 1])
        );
        // RX attenuator and PA enable
        assert_eq!(levels(&platform, CARD_CHIP, &[5, 6, 7]), driven(&[0, 0, 0]));
        // LNA enables and TX enable all low
        for input in [2, 3, 4] {
            assert_eq!(platform.mux_route(input), Some(0), "input {}", input);
        }
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 132), Some(1));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 133), Some(0));
    }

    #[test]
    fn without_reset_nothing_is_driven() {
        let (platform, diag) = setup();
        let bismuth = Bismuth::open(&platform, &BismuthConfig::new(2, CARD_CHIP, 0), diag).unwrap();

        // Only the mux reset on open
        assert!(platform
            .journal()
            .iter()
            .all(|t| matches!(t, Transaction::LinesSet { chip: BASE_GPIO_CHIP, .. })));
        assert_eq!(bismuth.pa().levels(), None);
    }

    #[test]
    fn out_of_range_pa_level_writes_nothing() {
        let (platform, diag) = setup();
        let mut bismuth = Bismuth::open(&platform, &bismuth_config(1), diag.clone()).unwrap();
        platform.drain_journal();

        bismuth.configure_pa(3).unwrap();

        assert_eq!(platform.write_count(), 0);
        assert_eq!(warning_messages(&diag), vec!["Power level must be 0-2"]);
    }

    #[test]
    fn out_of_range_attenuation_writes_nothing() {
        let (platform, diag) = setup();
        let mut bismuth = Bismuth::open(&platform, &bismuth_config(2), diag.clone()).unwrap();
        platform.drain_journal();

        bismuth.configure_rx_att(4).unwrap();

        assert_eq!(platform.write_count(), 0);
        assert_eq!(warning_messages(&diag), vec!["Attenuation level must be 0-3"]);
    }

    #[test]
    fn attenuator_and_pa_levels() {
        let (platform, diag) = setup();
        let mut bismuth = Bismuth::open(&platform, &bismuth_config(1), diag.clone()).unwrap();

        bismuth.configure_rx_att(2).unwrap();
        bismuth.configure_pa(2).unwrap();

        assert_eq!(levels(&platform, CARD_CHIP, &[5, 6]), driven(&[1, 0]));
        assert_eq!(levels(&platform, CARP_GPIO_CHIP, &[7, 8]), driven(&[1, 1]));
        assert!(diag.warnings().is_empty());
        assert!(diag
            .records()
            .iter()
            .any(|r| r.message == "RX attenuation set to 12dB"));
    }

    #[test]
    fn transmit_swaps_lnas_for_pa() {
        let (platform, diag) = setup();
        let mut bismuth = Bismuth::open(&platform, &bismuth_config(2), diag).unwrap();

        bismuth.configure_receive().unwrap();
        // RFP_2_ADGPO_0/1 are mux inputs 5 and 6
        assert_eq!(platform.mux_route(5), Some(1));
        assert_eq!(platform.mux_route(6), Some(1));

        bismuth.configure_transmit().unwrap();
        assert_eq!(platform.mux_route(5), Some(0));
        assert_eq!(platform.mux_route(6), Some(0));
        assert_eq!(platform.mux_route(7), Some(1));
        assert_eq!(platform.line_level(CARD_CHIP, 7), Some(1));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 132), Some(0));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 133), Some(1));
    }

    #[test]
    fn direct_lnas_use_gpo_register() {
        let (platform, diag) = setup();
        let config = BismuthConfig {
            carp: false,
            ..BismuthConfig::new(0, CARD_CHIP, 0)
        };
        let mut bismuth = Bismuth::open(&platform, &config, diag).unwrap();

        bismuth.enable_lnas().unwrap();
        assert_eq!(gpo_data(&platform), 0x30);

        bismuth.enable_pa().unwrap();
        assert_eq!(gpo_data(&platform), 0x40);
        // Direct backpack PA lines
        assert_eq!(platform.consumer(BASE_GPIO_CHIP, 94).as_deref(), Some("BISMUTH_PA"));
    }

    #[test]
    fn tx_filters_select_band() {
        let (platform, diag) = setup();
        let mut bismuth = Bismuth::open(&platform, &bismuth_config(1), diag).unwrap();

        bismuth.configure_tx_filters(450_000_000).unwrap();

        assert_eq!(levels(&platform, CARP_GPIO_CHIP, &[9, 10, 11]), driven(&[0, 1, 1]));
        assert_eq!(bismuth.tx_filters().levels(), Some(vec![0, 1, 1]));
    }
}

// ============================================================================
// Tellurium
// ============================================================================

mod tellurium_tests {
    use super::*;

    #[test]
    fn reset_baseline_direct() {
        let (platform, diag) = setup();
        Tellurium::open(&platform, &TelluriumConfig::new(0, CARD_CHIP, 0), diag).unwrap();

        // LPF unfiltered, HPF unfiltered across backpack and card
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[95, 96, 97]), driven(&[0, 0, 1]));
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[98, 99]), driven(&[0, 0]));
        assert_eq!(platform.line_level(CARD_CHIP, 0), Some(1));
        // PA lowest level and off; TX unfiltered
        assert_eq!(
            levels(&platform, CARD_CHIP, &[1, 2, 3, 4, 5, 7]),
            driven(&[0, 0, 0, 0, 1, 0])
        );
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 125), Some(1));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 126), Some(0));
    }

    #[test]
    fn rx_filters_span_backpack_and_card() {
        let (platform, diag) = setup();
        let mut tellurium =
            Tellurium::open(&platform, &TelluriumConfig::new(0, CARD_CHIP, 0), diag.clone())
                .unwrap();

        tellurium.configure_rx_filters(1_000_000_000).unwrap();

        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[95, 96, 97]), driven(&[1, 0, 1]));
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[98, 99]), driven(&[0, 1]));
        assert_eq!(platform.line_level(CARD_CHIP, 0), Some(1));
        assert_eq!(tellurium.rx_hpf().levels(), Some(vec![0, 1, 1]));

        let messages: Vec<String> = diag.records().into_iter().map(|r| r.message).collect();
        assert!(messages.contains(&"Set LPF to 1.37GHz".to_string()));
        assert!(messages.contains(&"Set HPF to 840MHz".to_string()));
    }

    #[test]
    fn carp_slot_two_uses_expander_lines() {
        let (platform, diag) = setup();
        let config = TelluriumConfig {
            carp: true,
            ..TelluriumConfig::new(2, CARD_CHIP, 0)
        };
        let mut tellurium = Tellurium::open(&platform, &config, diag).unwrap();

        assert_eq!(tellurium.name(), "tellurium_2");
        assert_eq!(levels(&platform, CARP_GPIO_CHIP, &[13, 14, 15]), driven(&[0, 0, 1]));
        assert_eq!(levels(&platform, CARP_GPIO_CHIP, &[16, 17]), driven(&[0, 0]));
        // RFP_2_ADGPO_2 is mux input 7
        assert_eq!(platform.mux_route(7), Some(0));

        tellurium.enable_pa().unwrap();
        assert_eq!(platform.mux_route(7), Some(1));
        assert_eq!(platform.line_level(CARD_CHIP, 7), Some(1));
    }

    #[test]
    fn receive_turns_pa_off_first() {
        let (platform, diag) = setup();
        let mut tellurium =
            Tellurium::open(&platform, &TelluriumConfig::new(0, CARD_CHIP, 0), diag).unwrap();
        tellurium.enable_pa().unwrap();
        tellurium.configure_transmit().unwrap();
        platform.drain_journal();

        tellurium.configure_receive().unwrap();

        let journal = platform.journal();
        let pa_off = journal
            .iter()
            .position(|t| *t == lines_set(CARD_CHIP, &[7], &[0]))
            .unwrap();
        let rx_on = journal
            .iter()
            .position(|t| *t == lines_set(BASE_GPIO_CHIP, &[125], &[1]))
            .unwrap();
        assert!(pa_off < rx_on);
    }

    #[test]
    fn out_of_range_pa_level_writes_nothing() {
        let (platform, diag) = setup();
        let mut tellurium =
            Tellurium::open(&platform, &TelluriumConfig::new(0, CARD_CHIP, 0), diag.clone())
                .unwrap();
        platform.drain_journal();

        tellurium.configure_pa(7).unwrap();

        assert_eq!(platform.write_count(), 0);
        assert_eq!(warning_messages(&diag), vec!["Power level must be 0-2"]);
    }
}

// ============================================================================
// Selenium
// ============================================================================

mod selenium_tests {
    use super::*;

    #[test]
    fn path_scoped_low_pass() {
        let (platform, diag) = setup();
        let mut selenium =
            Selenium::open(&platform, &SeleniumConfig::new(0, CARD_CHIP), diag).unwrap();

        selenium.configure_lpf(1_000_000_000, Some(1)).unwrap();

        assert_eq!(levels(&platform, CARD_CHIP, &[2, 3, 4]), driven(&[1, 0, 1]));
        // Path 0 keeps its reset state
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[95, 96, 97]), driven(&[0, 0, 1]));
    }

    #[test]
    fn both_paths_high_pass() {
        let (platform, diag) = setup();
        let mut selenium =
            Selenium::open(&platform, &SeleniumConfig::new(0, CARD_CHIP), diag).unwrap();

        selenium.configure_hpf(2_000_000_000, None).unwrap();

        assert_eq!(selenium.hpf(0).and_then(|b| b.levels()), Some(vec![1, 0, 1]));
        assert_eq!(selenium.hpf(1).and_then(|b| b.levels()), Some(vec![1, 0, 1]));
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 98), Some(1));
        assert_eq!(levels(&platform, CARD_CHIP, &[0, 1]), driven(&[0, 1]));
        assert_eq!(levels(&platform, CARD_CHIP, &[5, 6, 7]), driven(&[1, 0, 1]));
    }

    #[test]
    fn unknown_path_warns_without_writes() {
        let (platform, diag) = setup();
        let mut selenium =
            Selenium::open(&platform, &SeleniumConfig::new(0, CARD_CHIP), diag.clone()).unwrap();
        platform.drain_journal();

        selenium.configure_filters(1_000_000_000, Some(2)).unwrap();

        assert_eq!(platform.write_count(), 0);
        assert_eq!(
            warning_messages(&diag),
            vec!["RX path must be 0-1 or both", "RX path must be 0-1 or both"]
        );
    }

    #[test]
    fn carp_leaves_base_chip_alone() {
        let (platform, diag) = setup();
        let config = SeleniumConfig {
            carp: true,
            ..SeleniumConfig::new(1, CARD_CHIP)
        };
        Selenium::open(&platform, &config, diag).unwrap();

        assert_eq!(platform.consumer(BASE_GPIO_CHIP, 95), None);
        assert_eq!(platform.line_level(BASE_GPIO_CHIP, 95), None);
        assert_eq!(levels(&platform, CARP_GPIO_CHIP, &[7, 8, 9]), driven(&[0, 0, 1]));
        assert_eq!(platform.line_level(CARP_GPIO_CHIP, 10), Some(0));
        // Selenium needs no transceiver GPO, so the mux is never opened
        assert_eq!(mux_resets(&platform), 0);
    }
}

// ============================================================================
// Cardf
// ============================================================================

mod cardf_tests {
    use super::*;

    const CARDF_CHIP: u32 = 4;

    fn open(platform: &SimPlatform, diag: Arc<RecordingDiagnostics>) -> Cardf {
        let config = CardfConfig {
            reset: true,
            ..CardfConfig::new(CARDF_CHIP)
        };
        Cardf::open(platform, &config, diag).unwrap()
    }

    #[test]
    fn reset_baseline() {
        let (platform, diag) = setup();
        let cardf = open(&platform, diag);

        assert_eq!(cardf.name(), "cardf_4");
        // BPF unfiltered
        assert_eq!(levels(&platform, CARDF_CHIP, &[12, 10]), driven(&[0, 0]));
        // Both TX channels unfiltered
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[82, 83, 84]), driven(&[0, 0, 1]));
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[85, 86, 44]), driven(&[0, 0, 1]));
        // TX inhibited, TX enables and every amplifier off
        assert_eq!(platform.line_level(CARDF_CHIP, 11), Some(1));
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[78, 79]), driven(&[0, 0]));
        assert_eq!(
            levels(&platform, CARDF_CHIP, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
            driven(&[0; 10])
        );
        // Both channels receiving
        assert_eq!(
            levels(&platform, BASE_GPIO_CHIP, &[132, 135, 133, 136]),
            driven(&[1, 1, 0, 0])
        );
    }

    #[test]
    fn without_reset_nothing_is_written() {
        let (platform, diag) = setup();
        let _cardf = Cardf::open(&platform, &CardfConfig::new(CARDF_CHIP), diag).unwrap();

        assert_eq!(platform.write_count(), 0);
        assert_eq!(platform.consumer(CARDF_CHIP, 11).as_deref(), Some("CARDF_TX_INHIB"));
    }

    #[test]
    fn band_pass_selection() {
        let (platform, diag) = setup();
        let mut cardf = open(&platform, diag);

        cardf.configure_rx_filters(2_450_000_000).unwrap();
        assert_eq!(levels(&platform, CARDF_CHIP, &[12, 10]), driven(&[1, 0]));

        cardf.configure_rx_filters(915_000_000).unwrap();
        assert_eq!(levels(&platform, CARDF_CHIP, &[12, 10]), driven(&[0, 1]));

        cardf.configure_rx_filters(5_800_000_000).unwrap();
        assert_eq!(levels(&platform, CARDF_CHIP, &[12, 10]), driven(&[1, 1]));

        // Between bands falls back to unfiltered
        cardf.configure_rx_filters(1_500_000_000).unwrap();
        assert_eq!(cardf.rx_bpf().levels(), Some(vec![0, 0]));
    }

    #[test]
    fn tx_filters_per_channel() {
        let (platform, diag) = setup();
        let mut cardf = open(&platform, diag.clone());

        cardf.configure_tx_filters(1_000_000_000, Some(1)).unwrap();
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[85, 86, 44]), driven(&[1, 1, 0]));
        assert_eq!(levels(&platform, BASE_GPIO_CHIP, &[82, 83, 84]), driven(&[0, 0, 1]));

        cardf.configure_tx_filters(200_000_000, None).unwrap();
        assert_eq!(cardf.tx_filters(0).and_then(|b| b.levels()), Some(vec![1, 0, 1]));
        assert_eq!(cardf.tx_filters(1).and_then(|b| b.levels()), Some(vec![1, 0, 1]));

        platform.drain_journal();
        cardf.configure_tx_unfiltered(Some(2)).unwrap();
        assert_eq!(platform.write_count(), 0);
        assert_eq!(warning_messages(&diag), vec!["TX path must be 0-1 or both"]);
    }

    #[test]
    fn transmit_disables_lnas_before_pa() {
        let (platform, diag) = setup();
        let mut cardf = open(&platform, diag);
        cardf.configure_receive().unwrap();
        platform.drain_journal();

        cardf.configure_transmit().unwrap();

        assert_eq!(
            platform.journal(),
            vec![
                lines_set(CARDF_CHIP, &[0, 1, 2, 3], &[0, 0, 0, 0]),
                lines_set(BASE_GPIO_CHIP, &[132, 135], &[0, 0]),
                lines_set(BASE_GPIO_CHIP, &[133, 136], &[1, 1]),
                lines_set(CARDF_CHIP, &[8, 9], &[1, 1]),
                lines_set(BASE_GPIO_CHIP, &[78, 79], &[1, 1]),
                lines_set(CARDF_CHIP, &[11], &[0]),
            ]
        );
    }

    #[test]
    fn receive_inhibits_before_lnas() {
        let (platform, diag) = setup();
        let mut cardf = open(&platform, diag);
        cardf.configure_transmit().unwrap();
        platform.drain_journal();

        cardf.configure_receive().unwrap();

        let journal = platform.journal();
        assert_eq!(journal.first(), Some(&lines_set(CARDF_CHIP, &[11], &[1])));
        assert_eq!(
            journal.last(),
            Some(&lines_set(CARDF_CHIP, &[0, 1, 2, 3], &[1, 1, 1, 1]))
        );
    }

    #[test]
    fn bt_and_wifi_amplifiers() {
        let (platform, diag) = setup();
        let mut cardf = open(&platform, diag);

        cardf.enable_bt().unwrap();
        assert_eq!(levels(&platform, CARDF_CHIP, &[4, 6]), driven(&[1, 1]));
        assert_eq!(levels(&platform, CARDF_CHIP, &[5, 7]), driven(&[0, 0]));

        cardf.enable_wifi().unwrap();
        cardf.disable_bt().unwrap();
        assert_eq!(levels(&platform, CARDF_CHIP, &[4, 6]), driven(&[0, 0]));
        assert_eq!(levels(&platform, CARDF_CHIP, &[5, 7]), driven(&[1, 1]));
    }
}

// ============================================================================
// Card
// ============================================================================

mod card_tests {
    use super::*;

    const CARRIER_JSON: &str = r#"[
        { "board": "argon", "slot": 0, "gpiochip": 3, "i2c_bus": 1, "address": 43, "carp": true },
        { "board": "bismuth", "slot": 1, "gpiochip": 4, "transceiver": 1, "reset": true },
        { "board": "tellurium", "slot": 2, "gpiochip": 5, "carp": true, "control_rxtx": false },
        { "board": "selenium", "slot": 3, "gpiochip": 6, "carp": true }
    ]"#;

    #[test]
    fn boards_share_one_carrier() {
        let (platform, diag) = setup();
        let configs = CardConfig::list_from_json(CARRIER_JSON).unwrap();

        let mut cards = Card::open_all(&platform, &configs, diag.clone()).unwrap();

        let names: Vec<&str> = cards.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["argon_0", "bismuth_1", "tellurium_2", "selenium_3"]);
        assert_eq!(mux_resets(&platform), 1);
        assert!(diag.warnings().is_empty());

        for card in &mut cards {
            card.configure_transmit().unwrap();
        }
        // Argon RFP_0_ADGPO_2, Bismuth RFP_1_ADGPO_2
        assert_eq!(platform.mux_route(1), Some(1));
        assert_eq!(platform.mux_route(4), Some(1));
        // Tellurium switches RX/TX lines only, which it does not control here
        assert_eq!(platform.mux_route(7), Some(0));
        // Argon on transceiver 0, Bismuth on transceiver 1
        assert_eq!(
            levels(&platform, BASE_GPIO_CHIP, &[132, 133, 135, 136]),
            driven(&[0, 1, 0, 1])
        );

        for card in &mut cards {
            card.reset().unwrap();
        }
        assert_eq!(platform.mux_route(1), Some(0));
        assert_eq!(platform.mux_route(4), Some(0));
    }

    #[test]
    fn conflicting_lines_fail_open() {
        let (platform, diag) = setup();
        let configs = CardConfig::list_from_json(
            r#"[
                { "board": "tellurium", "slot": 0, "gpiochip": 3 },
                { "board": "selenium", "slot": 0, "gpiochip": 4 }
            ]"#,
        )
        .unwrap();

        let result = Card::open_all(&platform, &configs, diag);

        assert!(matches!(result, Err(BoardError::Line(_))));
    }

    #[test]
    fn open_single_cardf() {
        let (platform, diag) = setup();
        let config = CardConfig::from_json(r#"{"board": "cardf", "gpiochip": 4, "reset": true}"#)
            .unwrap();

        let mut card = Card::open(&platform, &config, diag).unwrap();
        card.configure_transmit().unwrap();

        assert_eq!(card.name(), "cardf_4");
        assert_eq!(platform.line_level(4, 11), Some(0));
    }

    #[test]
    fn selenium_ignores_transmit() {
        let (platform, diag) = setup();
        let config = CardConfig::Selenium(SeleniumConfig::new(0, CARD_CHIP));
        let mut card = Card::open(&platform, &config, diag).unwrap();
        platform.drain_journal();

        card.configure_transmit().unwrap();
        card.configure_receive().unwrap();

        assert_eq!(platform.write_count(), 0);
    }

    #[test]
    fn unknown_board_is_config_error() {
        let result = CardConfig::from_json(r#"{"board": "krypton", "gpiochip": 3}"#);
        assert!(matches!(result, Err(BoardError::Config(_))));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn tx_filter_index_rises_with_frequency(
        a in 0u64..20_000_000_000,
        b in 0u64..20_000_000_000,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = TX_FILTERS.classify(lo).unwrap();
        let hi = TX_FILTERS.classify(hi).unwrap();
        prop_assert!(lo.index <= hi.index);
    }

    #[test]
    fn high_pass_index_falls_with_frequency(
        a in 0u64..20_000_000_000,
        b in 0u64..20_000_000_000,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = RX_HIGH_PASS.classify(lo).unwrap();
        let hi = RX_HIGH_PASS.classify(hi).unwrap();
        prop_assert!(lo.index >= hi.index);
    }

    #[test]
    fn low_pass_edge_covers_frequency(hz in 0u64..9_999_999_999) {
        let selection = RX_LOW_PASS.classify(hz).unwrap();
        prop_assert_eq!(selection.levels.len(), 3);
        if let pc_card::FrequencyTable::UpTo(bands) = RX_LOW_PASS {
            prop_assert!(hz <= bands[selection.index].edge_hz);
            prop_assert!(selection.index == 0 || bands[selection.index - 1].edge_hz < hz);
        }
    }

    #[test]
    fn high_pass_edge_is_largest_below(hz in 0u64..20_000_000_000) {
        let selection = RX_HIGH_PASS.classify(hz).unwrap();
        if let pc_card::FrequencyTable::From(bands) = RX_HIGH_PASS {
            prop_assert!(hz >= bands[selection.index].edge_hz);
            prop_assert!(selection.index == 0 || bands[selection.index - 1].edge_hz > hz);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn synth_tunes_inside_its_bands(hz in 6_000_000_000u64..21_000_000_000) {
        let platform = SimPlatform::new();
        let diag = RecordingDiagnostics::new();
        let mut argon = Argon::open(&platform, &argon_config(), diag).unwrap();

        let tuned = argon.configure_synth(hz, true).unwrap();

        let state = argon.synth_state();
        prop_assert!(matches!(state, SynthState::Locked(_)));
        prop_assert_eq!(Some(hz - tuned), state.center_hz());
        prop_assert_eq!(platform.line_level(CARD_CHIP, 1), Some(1));
    }

    #[test]
    fn selenium_rejects_every_missing_path(path in 2usize..64, hz in 0u64..10_000_000_000) {
        let platform = SimPlatform::new();
        let diag = RecordingDiagnostics::new();
        let mut selenium =
            Selenium::open(&platform, &SeleniumConfig::new(0, CARD_CHIP), diag.clone()).unwrap();
        platform.drain_journal();

        selenium.configure_lpf(hz, Some(path)).unwrap();

        prop_assert_eq!(platform.write_count(), 0);
        prop_assert_eq!(diag.warnings().len(), 1);
    }
}
