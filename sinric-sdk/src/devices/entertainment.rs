//! Speakers and TVs.

use sinric_capabilities::controllers::{
    ChannelController, EqualizerController, InputController, MediaController, ModeController,
    MuteController, PowerStateController, VolumeController,
};

define_device! {
    Speaker => "SPEAKER" {
        requests: [
            power_state: PowerStateController => PowerStateCapability::power_state_controller,
            volume: VolumeController => VolumeCapability::volume_controller,
            mute: MuteController => MuteCapability::mute_controller,
            media: MediaController => MediaCapability::media_controller,
            equalizer: EqualizerController => EqualizerCapability::equalizer_controller,
            mode: ModeController => ModeCapability::mode_controller,
            input: InputController => InputCapability::input_controller,
        ],
        events: [],
    }
}

define_device! {
    Tv => "TV" {
        requests: [
            power_state: PowerStateController => PowerStateCapability::power_state_controller,
            volume: VolumeController => VolumeCapability::volume_controller,
            mute: MuteController => MuteCapability::mute_controller,
            media: MediaController => MediaCapability::media_controller,
            input: InputController => InputCapability::input_controller,
            channel: ChannelController => ChannelCapability::channel_controller,
        ],
        events: [],
    }
}
