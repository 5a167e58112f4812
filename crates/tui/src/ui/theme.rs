use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub dim: Color,
    pub border: Color,
    pub accent: Color,
    pub header: Color,
    pub zebra: Color,
    pub selected: Color,
    pub success: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(140, 140, 140),
            border: Color::Rgb(70, 80, 90),
            accent: Color::Rgb(80, 160, 160),
            header: Color::Rgb(30, 40, 50),
            zebra: Color::Rgb(20, 26, 32),
            selected: Color::Rgb(40, 70, 80),
            success: Color::Rgb(90, 180, 110),
            error: Color::Rgb(200, 80, 80),
        }
    }
}
