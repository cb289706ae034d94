//! MIDI device input
//!
//! Enumeration and connection to hardware or virtual MIDI inputs. Received
//! note messages are parsed and forwarded to the trainer's note queue; all
//! evaluation happens on the trainer loop, never in the callback.

use std::sync::Arc;

use midir::{MidiInput, MidiInputConnection};

use super::queue::{parse_message, NoteQueue};

/// Information about a MIDI input device
#[derive(Debug, Clone, serde::Serialize)]
pub struct MidiDeviceInfo {
    /// Device index (for connection)
    pub index: usize,
    /// Device name
    pub name: String,
}

/// Live connection to one MIDI input device
pub struct TrainerInput {
    /// The midir connection (kept alive for the duration of the session)
    #[allow(dead_code)]
    connection: MidiInputConnection<()>,
    device_name: String,
}

impl TrainerInput {
    /// List available MIDI input devices
    pub fn list_devices() -> Result<Vec<MidiDeviceInfo>, String> {
        let midi_in = MidiInput::new("staffrun-enumerate")
            .map_err(|e| format!("Failed to create MIDI input: {}", e))?;

        let ports = midi_in.ports();
        let mut devices = Vec::with_capacity(ports.len());
        for (index, port) in ports.iter().enumerate() {
            let name = midi_in
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {}", index));
            devices.push(MidiDeviceInfo { index, name });
        }
        Ok(devices)
    }

    /// Connect to a device by index, forwarding note events to the queue
    pub fn connect(device_index: usize, queue: Arc<NoteQueue>) -> Result<Self, String> {
        let midi_in = MidiInput::new("staffrun-input")
            .map_err(|e| format!("Failed to create MIDI input: {}", e))?;

        let ports = midi_in.ports();
        let port = ports
            .get(device_index)
            .ok_or_else(|| format!("Device index {} not found", device_index))?;

        let device_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| format!("Device {}", device_index));

        log::info!("Connecting to MIDI device: {}", device_name);

        let connection = midi_in
            .connect(
                port,
                "staffrun-midi-in",
                move |_timestamp, message, _| {
                    if let Some(event) = parse_message(message) {
                        log::trace!("MIDI in: {:?}", event);
                        queue.push(event);
                    }
                },
                (),
            )
            .map_err(|e| format!("Failed to connect to MIDI device: {}", e))?;

        log::info!("Successfully connected to MIDI device: {}", device_name);
        Ok(Self {
            connection,
            device_name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices() {
        // Should not fail even with no devices connected
        let result = TrainerInput::list_devices();
        assert!(result.is_ok());
    }
}
