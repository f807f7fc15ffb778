//! Built-in catalogue of number sets with representative numbers.

use super::registry::{MemberId, Registry, RegistryBuilder};
use super::validations::ModelError;

fn wiki(page: &str) -> Option<String> {
    Some(format!("https://en.wikipedia.org/wiki/{page}"))
}

struct Numbers {
    zero: MemberId,
    half: MemberId,
    one: MemberId,
    two: MemberId,
    three: MemberId,
    minus_one: MemberId,
    minus_two: MemberId,
    minus_three: MemberId,
    tenth: MemberId,
    sqrt_two: MemberId,
    cbrt_two: MemberId,
    pi: MemberId,
    e: MemberId,
    ln_two: MemberId,
    champernowne: MemberId,
    liouville: MemberId,
    uncomputable_liouville: MemberId,
    golden_ratio: MemberId,
    chaitin: MemberId,
    undefinable: MemberId,
    i: MemberId,
    e_times_i: MemberId,
    i_plus_pi: MemberId,
}

fn add_numbers(b: &mut RegistryBuilder) -> Numbers {
    Numbers {
        zero: b.member_with("0", "The integer zero.", wiki("0")),
        half: b.member_with("1/2", "One half.", wiki("One_half")),
        one: b.member_with("1", "The integer one.", wiki("1")),
        two: b.member_with("2", "The integer two.", wiki("2")),
        three: b.member_with("3", "The integer three.", wiki("3")),
        minus_one: b.member_with("-1", "The integer minus one.", wiki("−1")),
        minus_two: b.member_with("-2", "The integer minus two.", None),
        minus_three: b.member_with("-3", "The integer minus three.", None),
        tenth: b.member_with("0.1", "One tenth.", wiki("0.1")),
        sqrt_two: b.member_with(
            "√2",
            "Pythagoras' constant, approximately 1.41421.",
            wiki("Square_root_of_2"),
        ),
        cbrt_two: b.member_with("∛2", "The cube root of 2.", wiki("Cube_root")),
        pi: b.member_with(
            "π",
            "Ratio of a circle's circumference to its diameter, approximately 3.14159.",
            wiki("Pi"),
        ),
        e: b.member_with(
            "e",
            "Base of the natural logarithm, approximately 2.71828.",
            wiki("E_(mathematical_constant)"),
        ),
        ln_two: b.member_with(
            "ln2",
            "Natural logarithm of 2, approximately 0.693147.",
            wiki("Natural_logarithm_of_2"),
        ),
        champernowne: b.member_with(
            "C₁₀",
            "Concatenation of the natural numbers in base 10, a normal number.",
            wiki("Champernowne_constant"),
        ),
        liouville: b.member_with(
            "L",
            "Liouville's constant, the first number proven transcendental.",
            wiki("Liouville_number"),
        ),
        uncomputable_liouville: b.member_with(
            "L?",
            "Uncomputable Liouville numbers exist, but none is specifically known.",
            wiki("Liouville_number"),
        ),
        golden_ratio: b.member_with(
            "φ",
            "The golden ratio, positive solution of x² = x + 1.",
            wiki("Golden_ratio"),
        ),
        chaitin: b.member_with(
            "Ω",
            "Halting probability of a universal prefix-free machine; definable but not computable.",
            wiki("Chaitin%27s_constant"),
        ),
        undefinable: b.member_with(
            "?",
            "Most reals cannot be defined by any finite description.",
            None,
        ),
        i: b.member_with("i", "The imaginary unit, i² = -1.", wiki("Imaginary_unit")),
        e_times_i: b.member_with(
            "e*i",
            "Product of e and the imaginary unit.",
            wiki("Imaginary_unit"),
        ),
        i_plus_pi: b.member_with("i+π", "Sum of the imaginary unit and π.", None),
    }
}

/// Natural ⊂ Whole ⊂ Integers ⊂ Rational ⊂ Constructible ⊂ Algebraic, with
/// Real partitioned into algebraic/transcendental and rational/irrational and
/// Complex partitioned into real/imaginary.
pub fn number_registry() -> Result<Registry, ModelError> {
    let mut b = RegistryBuilder::new();
    let n = add_numbers(&mut b);

    let natural = b.category_with(
        "Natural",
        "ℕ",
        "The positive integers.",
        wiki("Natural_number"),
    );
    let whole = b.category_with(
        "Whole",
        "ℕ₀",
        "The non-negative integers, including zero.",
        wiki("Whole_number"),
    );
    let integers = b.category_with(
        "Integers",
        "ℤ",
        "Positive and negative whole numbers and zero.",
        wiki("Integer"),
    );
    let rational = b.category_with(
        "Rational",
        "ℚ",
        "Fractions of two integers.",
        wiki("Rational_number"),
    );
    let constructible = b.category_with(
        "Constructible",
        "C",
        "Lengths constructible with straightedge and compass.",
        wiki("Constructible_number"),
    );
    let algebraic = b.category_with(
        "Algebraic",
        "ℚ̅",
        "Roots of non-zero polynomials with rational coefficients.",
        wiki("Algebraic_number"),
    );
    let transcendental = b.category_with(
        "Transcendental",
        "ℝ \\ ℚ̅",
        "Real numbers that are not algebraic.",
        wiki("Transcendental_number"),
    );
    let irrational = b.category_with(
        "Irrational",
        "ℝ \\ ℚ",
        "Real numbers that are not a fraction of two integers.",
        wiki("Irrational_number"),
    );
    let computable = b.category_with(
        "Computable",
        "REC",
        "Reals computable to arbitrary precision by a terminating algorithm.",
        wiki("Computable_number"),
    );
    let definable = b.category_with(
        "Definable",
        "D",
        "Reals uniquely specified by a finite description.",
        wiki("Definable_real_number"),
    );
    let real = b.category_with(
        "Real",
        "ℝ",
        "All rational and irrational numbers.",
        wiki("Real_number"),
    );
    let pure_imaginary = b.category_with(
        "Pure Imaginary",
        "ℑ₀",
        "Complex numbers a * i without real part.",
        wiki("Imaginary_number"),
    );
    let imaginary = b.category_with(
        "Imaginary",
        "ℑ",
        "Complex numbers with a non-zero imaginary part.",
        wiki("Imaginary_number"),
    );
    let complex = b.category_with(
        "Complex",
        "ℂ",
        "Numbers of the form a + bi with real a and b.",
        wiki("Complex_number"),
    );
    let all = b.category_with("All Numbers", "", "Every number set of the catalogue.", None);

    b.elements(natural, &[n.one, n.two, n.three]);
    b.subsets(whole, &[natural]).elements(whole, &[n.zero]);
    b.subsets(integers, &[whole]).elements(
        integers,
        &[n.minus_one, n.two, n.three, n.minus_two, n.minus_three],
    );
    b.subsets(rational, &[integers])
        .elements(rational, &[n.half, n.tenth]);
    b.subsets(constructible, &[rational])
        .elements(constructible, &[n.sqrt_two, n.golden_ratio]);
    b.subsets(algebraic, &[constructible])
        .elements(algebraic, &[n.cbrt_two]);
    b.elements(
        transcendental,
        &[
            n.pi,
            n.e,
            n.chaitin,
            n.undefinable,
            n.liouville,
            n.uncomputable_liouville,
            n.ln_two,
            n.champernowne,
        ],
    );
    b.subsets(irrational, &[transcendental])
        .elements(irrational, &[n.sqrt_two, n.golden_ratio, n.cbrt_two]);
    b.subsets(computable, &[algebraic]).elements(
        computable,
        &[n.e, n.golden_ratio, n.pi, n.liouville, n.ln_two, n.champernowne],
    );
    b.subsets(definable, &[computable])
        .elements(definable, &[n.chaitin, n.uncomputable_liouville]);
    b.subsets(real, &[definable])
        .partition(real, &[algebraic, transcendental])
        .partition(real, &[rational, irrational]);
    b.elements(pure_imaginary, &[n.i, n.e_times_i]);
    b.subsets(imaginary, &[pure_imaginary])
        .elements(imaginary, &[n.i_plus_pi]);
    b.partition(complex, &[real, imaginary]);
    b.partition(all, &[complex]);

    b.required_by(n.zero, integers);
    b.required_by(n.half, real);

    b.build()
}
