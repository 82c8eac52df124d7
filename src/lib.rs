pub mod math {
    pub mod curve {
        pub mod curve;
        pub mod curveerror;
        pub mod xysequence;
        pub mod mutablexysequence;
    }
    pub mod interpolator;
    pub mod normal;
    pub mod round;
}

pub mod gmm {
    pub mod imt;
    pub mod gmminput;
    pub mod scalargroundmotion;
    pub mod gmmerror;
    pub mod gmmutils;
    pub mod groundmotionmodel;
    pub mod toro1997;
    pub mod campbell2003;
    pub mod boorejoynerfumal1997;
    pub mod tablegmm;
}

pub mod model {
    pub mod modelerror;
    pub mod location;
    pub mod site;
    pub mod rupture;
    pub mod mfd;
    pub mod sourcetype;
    pub mod source;
    pub mod gmmset;
    pub mod sourceset;
    pub mod hazardmodel;
}

pub mod calc {
    pub mod calcerror;
    pub mod exceedancemodel;
    pub mod executor;
    pub mod calcconfig;

    pub mod hazard {
        pub mod postprocess;
        pub mod hazard;
        pub mod hazardcalc;
    }

    pub mod disagg {
        pub mod disaggbins;
        pub mod disaggdataset;
        pub mod disaggregation;
        pub mod disaggexport;
    }

    pub mod rate {
        pub mod eqrate;
        pub mod ratebatch;
    }
}
