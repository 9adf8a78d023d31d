//! Static font-metric table for the leaflet body font (Arial / Helvetica).
//!
//! Character widths are in em units (relative to font size), taken from the Helvetica AFM
//! advance widths. This is an approximation of what a browser rasteriser produces: no kerning,
//! no ligatures, and non-ASCII characters fall back to an average width. That is accurate enough
//! to estimate block heights for pagination, which only needs line counts.
//!
//! The table covers ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table.
///
/// `widths[i]` = width of ASCII character `(i + 32)`, covering 0x20 (space) through 0x7E (~).
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    widths: [f64; 95],
    /// Fallback width for non-ASCII characters (accented letters, typographic punctuation).
    pub average_char_width: f64,
    pub space_width: f64,
    /// Multiplier applied to every width when the text is set in bold.
    pub bold_factor: f64,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f64 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    /// Counts the lines `s` occupies when greedily word-wrapped at `max_width_em`.
    ///
    /// A word wider than the line still takes a line of its own (browsers overflow or break it;
    /// either way it does not share the line). Empty or blank text is zero lines.
    pub fn wrapped_lines(&self, s: &str, max_width_em: f64) -> usize {
        let mut lines = 0usize;
        let mut current_width = 0.0_f64;
        let mut first_on_line = true;

        for word in s.split_whitespace() {
            let word_w = self.measure_str(word);
            if first_on_line {
                lines += 1;
                current_width = word_w;
                first_on_line = false;
            } else if current_width + self.space_width + word_w > max_width_em {
                // Current line is full; the word opens the next one.
                lines += 1;
                current_width = word_w;
            } else {
                current_width += self.space_width + word_w;
            }
        }

        lines
    }

    /// Same as `wrapped_lines` for bold text.
    pub fn wrapped_lines_bold(&self, s: &str, max_width_em: f64) -> usize {
        self.wrapped_lines(s, max_width_em / self.bold_factor)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Arial / Helvetica table
// ────────────────────────────────────────────────────────────────────────────

/// Arial / Helvetica regular, the font of the off-screen render container.
pub static ARIAL: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.54,
    space_width: 0.278,
    bold_factor: 1.07,
};

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(ARIAL.measure_str(""), 0.0);
    }

    #[test]
    fn test_measure_str_ascii_characters() {
        // "Dosis" = D(0.722) + o(0.556) + s(0.500) + i(0.222) + s(0.500) = 2.500
        let width = ARIAL.measure_str("Dosis");
        assert!((width - 2.5).abs() < 1e-9, "Dosis width should be 2.5, got {width}");
    }

    #[test]
    fn test_measure_str_non_ascii_falls_back() {
        let width = ARIAL.measure_str("ó");
        assert!((width - ARIAL.average_char_width).abs() < 1e-12);
    }

    #[test]
    fn test_wrapped_lines_blank_is_zero() {
        assert_eq!(ARIAL.wrapped_lines("", 40.0), 0);
        assert_eq!(ARIAL.wrapped_lines("   ", 40.0), 0);
    }

    #[test]
    fn test_wrapped_lines_short_text_is_one_line() {
        assert_eq!(ARIAL.wrapped_lines("Tome un comprimido", 40.0), 1);
    }

    #[test]
    fn test_wrapped_lines_long_text_wraps() {
        let text = "Tome un comprimido cada doce horas con abundante agua ".repeat(4);
        let wide = ARIAL.wrapped_lines(&text, 50.0);
        let narrow = ARIAL.wrapped_lines(&text, 20.0);
        assert!(wide >= 2, "long text should wrap, got {wide}");
        assert!(narrow > wide, "narrower column must need more lines");
    }

    #[test]
    fn test_oversized_word_takes_its_own_line() {
        assert_eq!(ARIAL.wrapped_lines("a supercalifragilistico b", 3.0), 3);
    }

    #[test]
    fn test_bold_wraps_no_earlier_than_regular() {
        let text = "Interacciones con otros medicamentos y alimentos";
        assert!(ARIAL.wrapped_lines_bold(text, 12.0) >= ARIAL.wrapped_lines(text, 12.0));
    }
}
